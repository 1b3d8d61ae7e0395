use brakelog_types::{RecordView, fields};

/// Outcome of comparing a record's severity against the threshold
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reportability {
    /// `sys_levelno` is at or above the threshold
    Report,
    /// `sys_levelno` is below the threshold
    Suppress,
    /// The record carries no numeric `sys_levelno`
    Unknown,
}

impl Reportability {
    /// Only `Report` lets a record through; `Unknown` is treated as `Suppress`
    pub fn should_report(self) -> bool {
        self == Self::Report
    }
}

/// Decide whether a record's severity qualifies it for reporting
pub fn needs_report<R: RecordView + ?Sized>(record: &R, threshold: i64) -> Reportability {
    match record.get_number(fields::LEVELNO) {
        Some(level) if level >= threshold as f64 => Reportability::Report,
        Some(_) => Reportability::Suppress,
        None => Reportability::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_at_and_above_threshold() {
        assert_eq!(needs_report(&json!({"sys_levelno": 40}), 40), Reportability::Report);
        assert_eq!(needs_report(&json!({"sys_levelno": 50}), 40), Reportability::Report);
    }

    #[test]
    fn test_below_threshold() {
        let verdict = needs_report(&json!({"sys_levelno": 30}), 40);
        assert_eq!(verdict, Reportability::Suppress);
        assert!(!verdict.should_report());
    }

    #[test]
    fn test_missing_severity_is_unknown() {
        let verdict = needs_report(&json!({"message": "no level"}), 0);
        assert_eq!(verdict, Reportability::Unknown);
        assert!(!verdict.should_report());

        // non-numeric values carry no usable severity either
        assert_eq!(
            needs_report(&json!({"sys_levelno": "ERROR"}), 0),
            Reportability::Unknown
        );
    }

    #[test]
    fn test_float_severity() {
        assert_eq!(needs_report(&json!({"sys_levelno": 45.0}), 40), Reportability::Report);
        assert_eq!(needs_report(&json!({"sys_levelno": 40.0}), 40), Reportability::Report);
        assert_eq!(needs_report(&json!({"sys_levelno": 39.5}), 40), Reportability::Suppress);
    }
}
