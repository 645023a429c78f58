//! Event channel protocol

use crate::api::UserInfo;
use crate::error::{ProtocolError, Result};
use crate::log_line::LogLine;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

/// Event names used on the channel
pub mod names {
    pub const LOG: &str = "log";
    pub const STATUS_UPDATE: &str = "status_update";
    pub const LOGS_CLEARED: &str = "logs_cleared";
    pub const ASK_CODE: &str = "ask_code";
    pub const ASK_PASSWORD: &str = "ask_password";
    pub const CODE_RESPONSE: &str = "code_response";
    pub const PASSWORD_RESPONSE: &str = "password_response";
}

/// Payload of `status_update`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
    /// `None`: key absent. `Some(None)`: explicitly no session.
    #[serde(default, deserialize_with = "present")]
    pub session: Option<Option<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Server -> client pushes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Log(LogLine),
    StatusUpdate(StatusUpdate),
    LogsCleared { message: Option<String> },
    AskCode,
    AskPassword,
}

impl ServerEvent {
    /// Resolve a named event and its first argument into a typed push
    pub fn decode(name: &str, payload: Option<&Value>) -> Result<Self> {
        match name {
            names::LOG => {
                let value = payload.unwrap_or(&Value::Null);
                LogLine::from_value(value).map(ServerEvent::Log)
            }
            names::STATUS_UPDATE => match payload {
                Some(value @ Value::Object(_)) => serde_json::from_value(value.clone())
                    .map(ServerEvent::StatusUpdate)
                    .map_err(|e| ProtocolError::MalformedPayload {
                        event: name.to_string(),
                        reason: e.to_string(),
                    }),
                _ => Err(ProtocolError::MalformedPayload {
                    event: name.to_string(),
                    reason: "expected an object".to_string(),
                }),
            },
            names::LOGS_CLEARED => Ok(ServerEvent::LogsCleared {
                message: payload
                    .and_then(|v| v.get("message"))
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string),
            }),
            names::ASK_CODE => Ok(ServerEvent::AskCode),
            names::ASK_PASSWORD => Ok(ServerEvent::AskPassword),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Log(_) => names::LOG,
            ServerEvent::StatusUpdate(_) => names::STATUS_UPDATE,
            ServerEvent::LogsCleared { .. } => names::LOGS_CLEARED,
            ServerEvent::AskCode => names::ASK_CODE,
            ServerEvent::AskPassword => names::ASK_PASSWORD,
        }
    }
}

/// Client -> server messages
#[derive(Clone, PartialEq, Eq)]
pub enum ClientEvent {
    CodeResponse { code: String },
    PasswordResponse { password: String },
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::CodeResponse { .. } => names::CODE_RESPONSE,
            ClientEvent::PasswordResponse { .. } => names::PASSWORD_RESPONSE,
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ClientEvent::CodeResponse { code } => json!({ "code": code }),
            ClientEvent::PasswordResponse { password } => json!({ "password": password }),
        }
    }
}

// Keeps login secrets out of debug logs.
impl std::fmt::Debug for ClientEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientEvent::CodeResponse { .. } => f.write_str("CodeResponse { code: <redacted> }"),
            ClientEvent::PasswordResponse { .. } => {
                f.write_str("PasswordResponse { password: <redacted> }")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_update_distinguishes_absent_and_null_session() {
        let absent = ServerEvent::decode("status_update", Some(&json!({"connected": true})));
        let null = ServerEvent::decode(
            "status_update",
            Some(&json!({"connected": false, "user_info": null, "session": null})),
        );
        let named = ServerEvent::decode(
            "status_update",
            Some(&json!({"connected": true, "session": "main"})),
        );

        match (absent.unwrap(), null.unwrap(), named.unwrap()) {
            (
                ServerEvent::StatusUpdate(a),
                ServerEvent::StatusUpdate(b),
                ServerEvent::StatusUpdate(c),
            ) => {
                assert_eq!(a.session, None);
                assert_eq!(b.session, Some(None));
                assert_eq!(c.session, Some(Some("main".to_string())));
            }
            other => panic!("unexpected decode: {:?}", other),
        }
    }

    #[test]
    fn status_update_carries_error() {
        let event = ServerEvent::decode(
            "status_update",
            Some(&json!({
                "connected": false,
                "error": "Falha na conexão",
                "session": "main"
            })),
        )
        .unwrap();

        let ServerEvent::StatusUpdate(update) = event else {
            panic!("expected status update");
        };
        assert_eq!(update.error.as_deref(), Some("Falha na conexão"));
    }

    #[test]
    fn challenges_have_no_payload() {
        assert_eq!(ServerEvent::decode("ask_code", None).unwrap(), ServerEvent::AskCode);
        assert_eq!(
            ServerEvent::decode("ask_password", None).unwrap(),
            ServerEvent::AskPassword
        );
    }

    #[test]
    fn logs_cleared_message_is_optional() {
        assert_eq!(
            ServerEvent::decode("logs_cleared", Some(&json!({}))).unwrap(),
            ServerEvent::LogsCleared { message: None }
        );
        assert_eq!(
            ServerEvent::decode("logs_cleared", Some(&json!({"message": "cleared"}))).unwrap(),
            ServerEvent::LogsCleared {
                message: Some("cleared".into())
            }
        );
    }

    #[test]
    fn malformed_log_is_an_error() {
        let err = ServerEvent::decode("log", Some(&json!([1, 2]))).unwrap_err();
        assert!(matches!(err, ProtocolError::MalformedPayload { .. }));
    }

    #[test]
    fn unknown_events_are_reported() {
        let err = ServerEvent::decode("typing", None).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownEvent(name) if name == "typing"));
    }

    #[test]
    fn client_events_redact_secrets_in_debug() {
        let event = ClientEvent::PasswordResponse {
            password: "hunter2".into(),
        };
        assert!(!format!("{:?}", event).contains("hunter2"));
        assert_eq!(event.payload(), json!({"password": "hunter2"}));
    }
}
