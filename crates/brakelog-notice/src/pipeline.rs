use brakelog_config::DeliveryConfig;
use brakelog_types::{EventTime, Notice, RecordView};

use crate::builder;

/// Outbound seam to the delivery client.
///
/// Transport, authentication, retries and failure handling all belong to
/// the implementor; the pipeline never looks at the outcome.
pub trait NoticeSender {
    fn send(&self, notice: Notice);
}

impl<S: NoticeSender + ?Sized> NoticeSender for &S {
    fn send(&self, notice: Notice) {
        (**self).send(notice)
    }
}

impl<S: NoticeSender + ?Sized> NoticeSender for Box<S> {
    fn send(&self, notice: Notice) {
        (**self).send(notice)
    }
}

/// Counts for one processed batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub records: usize,
    pub notices: usize,
}

/// Turns batches of records into notices and hands them to a sender
pub struct Pipeline<'a, S> {
    config: &'a DeliveryConfig,
    sender: S,
}

impl<'a, S: NoticeSender> Pipeline<'a, S> {
    pub fn new(config: &'a DeliveryConfig, sender: S) -> Self {
        Self { config, sender }
    }

    pub fn config(&self) -> &DeliveryConfig {
        self.config
    }

    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// Process a whole batch, then signal `continuation` exactly once
    pub fn emit<R, I, C>(&self, tag: &str, batch: I, continuation: C) -> EmitSummary
    where
        R: RecordView,
        I: IntoIterator<Item = (EventTime, R)>,
        C: FnOnce(),
    {
        let mut summary = EmitSummary::default();

        for (time, record) in batch {
            summary.records += 1;
            if let Some(notice) = builder::build(self.config, tag, &record) {
                tracing::trace!(
                    tag,
                    %time,
                    error_class = ?notice.error_class,
                    "Sending notice"
                );
                self.sender.send(notice);
                summary.notices += 1;
            }
        }

        tracing::debug!(
            tag,
            records = summary.records,
            notices = summary.notices,
            "Batch processed"
        );

        continuation();
        summary
    }
}
