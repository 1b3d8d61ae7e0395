//! Event input for the host runtime
//!
//! Each input line is a forward-style triple `["tag", time, {record}]`, with
//! `time` in (possibly fractional) epoch seconds. Consecutive events sharing
//! a tag are grouped into batches.

use anyhow::{Context, Result, anyhow};
use chrono::DateTime;
use serde_json::Value;

use brakelog_types::EventTime;

/// A single tagged event
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub tag: String,
    pub time: EventTime,
    pub record: Value,
}

/// Parse one NDJSON line into an event
pub fn parse_line(line: &str) -> Result<Event> {
    let (tag, time, record): (String, f64, Value) =
        serde_json::from_str(line).context("expected [tag, time, record]")?;

    let floor = time.floor();
    let secs = floor as i64;
    let nanos = ((time - floor) * 1e9).round() as u32;
    let time = DateTime::from_timestamp(secs, nanos.min(999_999_999))
        .ok_or_else(|| anyhow!("timestamp {time} out of range"))?;

    Ok(Event { tag, time, record })
}

/// Events for one tag, ready for the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub tag: String,
    pub events: Vec<(EventTime, Value)>,
}

/// Groups consecutive same-tag events into bounded batches
pub struct Batcher {
    max_size: usize,
    tag: Option<String>,
    events: Vec<(EventTime, Value)>,
}

impl Batcher {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size: max_size.max(1),
            tag: None,
            events: Vec::new(),
        }
    }

    /// Add an event, returning the previous batch if the tag changed
    pub fn push(&mut self, event: Event) -> Option<Batch> {
        let tag_changed = self.tag.as_deref().is_some_and(|tag| tag != event.tag);
        let flushed = if tag_changed { self.take() } else { None };

        self.tag = Some(event.tag);
        self.events.push((event.time, event.record));
        flushed
    }

    /// Take the pending batch once it has reached the size limit
    pub fn take_full(&mut self) -> Option<Batch> {
        if self.events.len() >= self.max_size {
            self.take()
        } else {
            None
        }
    }

    /// Take whatever is pending at end of input
    pub fn finish(&mut self) -> Option<Batch> {
        self.take()
    }

    fn take(&mut self) -> Option<Batch> {
        if self.events.is_empty() {
            return None;
        }
        let tag = self.tag.clone()?;
        Some(Batch {
            tag,
            events: std::mem::take(&mut self.events),
        })
    }
}
