//! Record qualification and notice construction for brakelog
//!
//! This crate decides whether a log record is worth reporting and turns the
//! ones that are into [`Notice`]s for the delivery client.

pub mod builder;
pub mod extract;
pub mod gate;
mod pipeline;

pub use builder::build;
pub use gate::{Reportability, needs_report};
pub use pipeline::{EmitSummary, NoticeSender, Pipeline};

// Re-export types used in our public API
pub use brakelog_config::DeliveryConfig;
pub use brakelog_types::{EventTime, Frame, Notice, RecordView};
