//! Reference delivery client writing notices as JSON lines

use std::cell::{Cell, RefCell};
use std::io::{self, Write};

use serde_json::Value;

use brakelog_config::DeliveryConfig;
use brakelog_notice::{Notice, NoticeSender};
use brakelog_types::Mapping;

/// Replacement for values under filtered keys
pub const FILTERED: &str = "[FILTERED]";

/// Writes each notice as one JSON line.
///
/// Notices are withheld entirely in development environments, and values
/// under `param_filters` keys are redacted before serialization.
pub struct JsonLinesSender<W> {
    out: RefCell<W>,
    param_filters: Vec<String>,
    withhold: bool,
    sent: Cell<usize>,
}

impl JsonLinesSender<io::Stdout> {
    pub fn stdout(config: &DeliveryConfig) -> Self {
        Self::new(config, io::stdout())
    }
}

impl<W: Write> JsonLinesSender<W> {
    pub fn new(config: &DeliveryConfig, out: W) -> Self {
        Self {
            out: RefCell::new(out),
            param_filters: config.param_filters.clone(),
            withhold: config.is_development(),
            sent: Cell::new(0),
        }
    }

    /// Number of notices written so far
    pub fn sent(&self) -> usize {
        self.sent.get()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.out.borrow_mut().flush()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write(&self, notice: &Notice) -> io::Result<()> {
        let mut out = self.out.borrow_mut();
        serde_json::to_writer(&mut *out, notice)?;
        out.write_all(b"\n")
    }
}

impl<W: Write> NoticeSender for JsonLinesSender<W> {
    fn send(&self, mut notice: Notice) {
        if self.withhold {
            tracing::debug!(
                environment = %notice.environment.environment_name,
                "Development environment, notice withheld"
            );
            return;
        }

        for dump in [
            &mut notice.parameters,
            &mut notice.cgi_data,
            &mut notice.session_data,
        ] {
            redact(dump, &self.param_filters);
        }

        match self.write(&notice) {
            Ok(()) => self.sent.set(self.sent.get() + 1),
            Err(e) => tracing::warn!(error = %e, "Failed to write notice"),
        }
    }
}

/// Replace values under filtered keys, descending into nested mappings
fn redact(mapping: &mut Mapping, filters: &[String]) {
    if filters.is_empty() {
        return;
    }
    for (key, value) in mapping.iter_mut() {
        if filters.iter().any(|f| f == key) {
            *value = Value::String(FILTERED.to_string());
        } else if let Value::Object(nested) = value {
            redact(nested, filters);
        }
    }
}
