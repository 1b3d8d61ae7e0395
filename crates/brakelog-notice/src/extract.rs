//! Projections of single semantic values out of a record.
//!
//! None of these fail: a missing or mistyped field is simply absent.

use regex::Regex;

use brakelog_config::MessageTemplate;
use brakelog_types::{ExceptionInfo, Mapping, RecordView, fields};

/// Logger name, e.g. `app.db`
pub fn component_name<R: RecordView + ?Sized>(record: &R) -> Option<&str> {
    record.get_str(fields::NAME)
}

/// Function that emitted the record
pub fn action_name<R: RecordView + ?Sized>(record: &R) -> Option<&str> {
    record.get_str(fields::FUNCNAME)
}

pub fn hostname<R: RecordView + ?Sized>(record: &R) -> Option<&str> {
    record.get_str(fields::HOST)
}

/// Replace the first match of `pattern` in the message with `template`
pub fn rewritten_message<R: RecordView + ?Sized>(
    record: &R,
    pattern: &Regex,
    template: &MessageTemplate,
) -> Option<String> {
    let message = record.get_str(fields::MESSAGE)?;
    Some(template.rewrite(pattern, message))
}

/// Mapping stored under a configured dump key
pub fn dump<'r, R: RecordView + ?Sized>(record: &'r R, key: Option<&str>) -> Option<&'r Mapping> {
    record.get_mapping(key?)
}

pub fn exception_info<R: RecordView + ?Sized>(record: &R) -> Option<ExceptionInfo> {
    record
        .get_mapping(fields::EXC_INFO)
        .map(ExceptionInfo::from_mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(text: &str) -> MessageTemplate {
        MessageTemplate::parse(text)
    }

    fn whole_match() -> Regex {
        regex::RegexBuilder::new(".*")
            .dot_matches_new_line(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_names() {
        let record = json!({"sys_name": "app.db", "sys_funcname": "connect", "sys_host": "web-1"});
        assert_eq!(component_name(&record), Some("app.db"));
        assert_eq!(action_name(&record), Some("connect"));
        assert_eq!(hostname(&record), Some("web-1"));

        let empty = json!({});
        assert_eq!(component_name(&empty), None);
        assert_eq!(action_name(&empty), None);
    }

    #[test]
    fn test_pass_through_message() {
        let record = json!({"message": "line one\nline two"});
        assert_eq!(
            rewritten_message(&record, &whole_match(), &template("\\0")).as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn test_rewrite_first_match_only() {
        let record = json!({"message": "id=1 id=2"});
        let pattern = Regex::new(r"id=\d+").unwrap();
        assert_eq!(
            rewritten_message(&record, &pattern, &template("id=?")).as_deref(),
            Some("id=? id=2")
        );
    }

    #[test]
    fn test_rewrite_with_group_reference() {
        let record = json!({"message": "Traceback: KeyError('x')"});
        let pattern = Regex::new(r"^Traceback: (.*)$").unwrap();
        assert_eq!(
            rewritten_message(&record, &pattern, &template("\\1")).as_deref(),
            Some("KeyError('x')")
        );
    }

    #[test]
    fn test_rewrite_is_idempotent_when_template_does_not_match() {
        let record = json!({"message": "user 1234 failed"});
        let pattern = Regex::new(r"\d+").unwrap();
        let replace = template("N");
        let once = rewritten_message(&record, &pattern, &replace).unwrap();
        let twice = rewritten_message(&json!({"message": once.clone()}), &pattern, &replace).unwrap();
        assert_eq!(once, "user N failed");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_missing_message() {
        assert_eq!(
            rewritten_message(&json!({}), &whole_match(), &template("\\0")),
            None
        );
        assert_eq!(
            rewritten_message(&json!({"message": 42}), &whole_match(), &template("\\0")),
            None
        );
    }

    #[test]
    fn test_dump_lookup() {
        let record = json!({"request": {"path": "/"}, "flag": true});
        assert_eq!(
            dump(&record, Some("request")).and_then(|m| m.get("path")),
            Some(&json!("/"))
        );
        assert!(dump(&record, None).is_none());
        assert!(dump(&record, Some("missing")).is_none());
        assert!(dump(&record, Some("flag")).is_none());
    }

    #[test]
    fn test_exception_info_requires_mapping() {
        assert!(exception_info(&json!({"sys_exc_info": "ValueError"})).is_none());
        assert!(exception_info(&json!({"sys_exc_info": {"type": "ValueError"}})).is_some());
    }
}
