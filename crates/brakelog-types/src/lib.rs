//! Shared types for brakelog
//!
//! This crate contains the record accessor, the notice model and the Python
//! log level table used across the brakelog crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// JSON object, the representation of nested record fields and dumps
pub type Mapping = serde_json::Map<String, Value>;

/// Timestamp attached to each record by the host runtime
pub type EventTime = DateTime<Utc>;

// ============================================================================
// Record Access
// ============================================================================

/// Field names written by the Python logging handler
pub mod fields {
    pub const LEVELNO: &str = "sys_levelno";
    pub const EXC_INFO: &str = "sys_exc_info";
    pub const MESSAGE: &str = "message";
    pub const NAME: &str = "sys_name";
    pub const FUNCNAME: &str = "sys_funcname";
    pub const HOST: &str = "sys_host";

    /// Keys inside `sys_exc_info`
    pub const EXC_TYPE: &str = "type";
    pub const EXC_TRACEBACK: &str = "traceback";
}

/// Read-only view over a log record.
///
/// Every accessor returns `None` when the field is missing or holds a value
/// of another type. Implementors only need `get_value`.
pub trait RecordView {
    fn get_value(&self, key: &str) -> Option<&Value>;

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get_value(key)?.as_str()
    }

    /// Integral numbers only; floats and numeric strings are absent
    fn get_int(&self, key: &str) -> Option<i64> {
        self.get_value(key)?.as_i64()
    }

    /// Any JSON number, integral or not
    fn get_number(&self, key: &str) -> Option<f64> {
        self.get_value(key)?.as_f64()
    }

    fn get_mapping(&self, key: &str) -> Option<&Mapping> {
        self.get_value(key)?.as_object()
    }

    fn get_sequence(&self, key: &str) -> Option<&[Value]> {
        self.get_value(key)?.as_array().map(Vec::as_slice)
    }
}

impl RecordView for Mapping {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl RecordView for HashMap<String, Value> {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

/// A non-object value behaves as an empty record
impl RecordView for Value {
    fn get_value(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }
}

impl<R: RecordView + ?Sized> RecordView for &R {
    fn get_value(&self, key: &str) -> Option<&Value> {
        (**self).get_value(key)
    }
}

// ============================================================================
// Exception Types
// ============================================================================

/// One stack frame, in call-site order within a backtrace
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub file: String,
    pub line: i64,
    pub function: String,
}

impl Frame {
    pub fn new(file: impl Into<String>, line: i64, function: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// Build a frame from a raw `[file, line, function]` triple.
    ///
    /// Missing or mistyped elements fall back to `""` and `0` so that a
    /// damaged frame still occupies its slot in the backtrace.
    pub fn from_raw(raw: &Value) -> Self {
        let parts = raw.as_array().map(Vec::as_slice).unwrap_or_default();
        let text = |idx: usize| {
            parts
                .get(idx)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        Self {
            file: text(0),
            line: parts.get(1).and_then(Value::as_i64).unwrap_or(0),
            function: text(2),
        }
    }
}

/// Exception details carried by a record that logged a caught exception
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExceptionInfo {
    /// Exception class name
    pub error_type: Option<String>,

    /// Frames from outermost call to the point of failure
    pub traceback: Vec<Frame>,
}

impl ExceptionInfo {
    /// Read exception info from the `sys_exc_info` mapping
    pub fn from_mapping(exc: &Mapping) -> Self {
        let traceback = exc
            .get_sequence(fields::EXC_TRACEBACK)
            .unwrap_or_default()
            .iter()
            .map(Frame::from_raw)
            .collect();

        Self {
            error_type: exc.get_str(fields::EXC_TYPE).map(str::to_string),
            traceback,
        }
    }
}

// ============================================================================
// Notice Types
// ============================================================================

/// Environment and notifier identity stamped onto every notice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeEnvironment {
    pub environment_name: String,
    pub project_root: String,
    pub notifier_name: String,
    pub notifier_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifier_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_information: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
}

impl Default for NoticeEnvironment {
    fn default() -> Self {
        Self {
            environment_name: "production".to_string(),
            project_root: String::new(),
            notifier_name: "brakelog".to_string(),
            notifier_version: env!("CARGO_PKG_VERSION").to_string(),
            notifier_url: None,
            user_information: None,
            framework: None,
        }
    }
}

/// A normalized error report, ready for the delivery client.
///
/// The serialized form of this struct is the wire contract with the
/// delivery client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notice {
    pub error_class: Option<String>,
    pub error_message: Option<String>,
    pub backtrace: Vec<Frame>,
    pub component: Option<String>,
    pub action: Option<String>,
    pub hostname: Option<String>,
    pub project_id: String,
    pub cgi_data: Mapping,
    pub session_data: Mapping,
    pub parameters: Mapping,
    #[serde(flatten)]
    pub environment: NoticeEnvironment,
}

// ============================================================================
// Log Levels
// ============================================================================

/// Standard Python logging levels
pub const PY_LOG_LEVELS: [(&str, i64); 8] = [
    ("CRITICAL", 50),
    ("FATAL", 50),
    ("ERROR", 40),
    ("WARNING", 30),
    ("WARN", 30),
    ("INFO", 20),
    ("DEBUG", 10),
    ("NOTSET", 0),
];

/// Level name that is neither an integer nor a Python level
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level '{0}'")]
pub struct UnknownLevel(pub String);

/// Look up a Python level by its exact (upper case) name
pub fn level_by_name(name: &str) -> Option<i64> {
    PY_LOG_LEVELS
        .iter()
        .find(|(level, _)| *level == name)
        .map(|(_, value)| *value)
}

/// Resolve a configured threshold: a literal integer first, then a level name
pub fn resolve_threshold(setting: &str) -> Result<i64, UnknownLevel> {
    if let Ok(value) = setting.trim().parse::<i64>() {
        return Ok(value);
    }
    level_by_name(setting).ok_or_else(|| UnknownLevel(setting.to_string()))
}
