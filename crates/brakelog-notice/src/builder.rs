use brakelog_config::DeliveryConfig;
use brakelog_types::{Mapping, Notice, RecordView};

use crate::extract;
use crate::gate::{Reportability, needs_report};

/// Build a notice for a record, or `None` when it should not be reported.
///
/// A notice requires both a qualifying severity and exception info.
pub fn build<R: RecordView + ?Sized>(
    config: &DeliveryConfig,
    tag: &str,
    record: &R,
) -> Option<Notice> {
    match needs_report(record, config.threshold) {
        Reportability::Report => {}
        Reportability::Suppress => return None,
        Reportability::Unknown => {
            tracing::trace!(tag, "Record has no severity, not reporting");
            return None;
        }
    }

    let Some(exception) = extract::exception_info(record) else {
        tracing::trace!(tag, "Record has no exception info, not reporting");
        return None;
    };

    let dump = |key: &Option<String>| -> Mapping {
        extract::dump(record, key.as_deref())
            .cloned()
            .unwrap_or_default()
    };

    Some(Notice {
        error_class: exception.error_type,
        error_message: extract::rewritten_message(
            record,
            &config.message_pattern,
            &config.message_template,
        ),
        backtrace: exception.traceback,
        component: extract::component_name(record).map(str::to_string),
        action: extract::action_name(record).map(str::to_string),
        hostname: extract::hostname(record).map(str::to_string),
        project_id: config
            .project_id
            .clone()
            .unwrap_or_else(|| tag.to_string()),
        cgi_data: dump(&config.dump_keys.cgi_data),
        session_data: dump(&config.dump_keys.session),
        parameters: dump(&config.dump_keys.parameters),
        environment: config.environment.clone(),
    })
}
