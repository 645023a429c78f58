//! Log lines as they arrive from `/api/logs` and the `log` push

use crate::error::{ProtocolError, Result};
use serde_json::Value;

/// Severity of an activity entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Plain,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
    System,
    /// Any other label the backend sends, lower-cased
    Other(String),
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "" => Severity::Plain,
            "debug" => Severity::Debug,
            "info" => Severity::Info,
            "warning" | "warn" => Severity::Warning,
            "error" => Severity::Error,
            "critical" => Severity::Critical,
            "system" => Severity::System,
            other => Severity::Other(other.to_string()),
        }
    }

    /// Lower-case label, also used as the CSS class of a rendered entry
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Plain => "",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Critical => "critical",
            Severity::System => "system",
            Severity::Other(label) => label,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error | Severity::Critical)
    }
}

/// A log payload resolved once at the channel boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLine {
    Text(String),
    Structured { text: String, severity: Severity },
}

impl LogLine {
    /// Accepts a JSON string or an object carrying a non-empty `message`
    /// string and an optional `type`. Anything else is rejected.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(text) => Ok(LogLine::Text(text.clone())),
            Value::Object(map) => {
                let text = map
                    .get("message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .ok_or_else(|| malformed("object without a message string"))?;
                match map.get("type").and_then(Value::as_str) {
                    Some(label) if !label.is_empty() => Ok(LogLine::Structured {
                        text: text.to_string(),
                        severity: Severity::from_label(label),
                    }),
                    _ => Ok(LogLine::Text(text.to_string())),
                }
            }
            other => Err(malformed(&format!("unexpected {}", kind_of(other)))),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            LogLine::Text(text) => text,
            LogLine::Structured { text, .. } => text,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            LogLine::Text(_) => Severity::Plain,
            LogLine::Structured { severity, .. } => severity.clone(),
        }
    }
}

fn malformed(reason: &str) -> ProtocolError {
    ProtocolError::MalformedPayload {
        event: "log".to_string(),
        reason: reason.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_strings_become_text() {
        let line = LogLine::from_value(&json!("2024-01-01 - INFO - started")).unwrap();
        assert_eq!(line, LogLine::Text("2024-01-01 - INFO - started".into()));
        assert_eq!(line.severity(), Severity::Plain);
    }

    #[test]
    fn objects_keep_their_severity() {
        let line = LogLine::from_value(&json!({
            "message": "Connected",
            "type": "WARNING",
            "timestamp": "2024-01-01T00:00:00"
        }))
        .unwrap();

        assert_eq!(line.text(), "Connected");
        assert_eq!(line.severity(), Severity::Warning);
    }

    #[test]
    fn object_without_type_is_plain_text() {
        let line = LogLine::from_value(&json!({"message": "hello", "type": ""})).unwrap();
        assert_eq!(line, LogLine::Text("hello".into()));
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        assert!(LogLine::from_value(&json!(42)).is_err());
        assert!(LogLine::from_value(&json!({"text": "no message"})).is_err());
        assert!(LogLine::from_value(&json!({"message": ""})).is_err());
        assert!(LogLine::from_value(&json!(null)).is_err());
    }

    #[test]
    fn unknown_labels_are_kept() {
        assert_eq!(
            Severity::from_label("Notice"),
            Severity::Other("notice".into())
        );
        assert_eq!(Severity::from_label("notice").as_str(), "notice");
    }
}
