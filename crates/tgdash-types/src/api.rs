//! HTTP request and response payloads for the dashboard backend

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Endpoint paths
pub mod paths {
    pub const STATUS: &str = "/api/status";
    pub const SESSIONS: &str = "/api/sessions";
    pub const LOGS: &str = "/api/logs";
    pub const CONNECT: &str = "/api/connect";
    pub const DISCONNECT: &str = "/api/disconnect";
    pub const REMOVE_SESSION: &str = "/api/remove-session";
    pub const CLEAR_LOGS: &str = "/api/clear-logs";
    pub const TOGGLE_AUTO_CLEAR: &str = "/api/toggle-auto-clear";
    pub const CHATS: &str = "/api/chats";
    pub const SEND_MESSAGE: &str = "/api/send-message";
}

/// Telegram account reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
}

impl UserInfo {
    /// Display label, only when the backend supplied a first name
    pub fn label(&self) -> Option<String> {
        let name = self.first_name.as_deref().filter(|n| !n.is_empty())?;
        Some(format!(
            "{} (ID: {})",
            name,
            self.id.as_deref().unwrap_or("?")
        ))
    }
}

/// `GET /api/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
    #[serde(default)]
    pub current_session: Option<String>,
    #[serde(default)]
    pub auto_clear_logs: Option<bool>,
    /// Seconds
    #[serde(default)]
    pub auto_clear_interval: Option<u64>,
}

/// `GET /api/sessions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub current_session: Option<String>,
}

/// `POST /api/connect`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub session_name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// `status` field shared by the action endpoints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Success,
    Error,
    Disconnected,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Generic `{status, message}` reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionResponse {
    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == ActionStatus::Error
    }

    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message.as_deref().unwrap_or(fallback)
    }
}

/// `POST /api/remove-session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveSessionRequest {
    pub session_name: String,
}

/// `POST /api/toggle-auto-clear`
///
/// The toggle and the interval are sent separately; absent fields are not
/// serialized at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoClearRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
}

impl AutoClearRequest {
    pub fn toggle(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            interval: None,
        }
    }

    pub fn interval(minutes: u32) -> Self {
        Self {
            enabled: None,
            interval: Some(minutes),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoClearResponse {
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub auto_clear_logs: Option<bool>,
    /// Minutes
    #[serde(default)]
    pub auto_clear_interval: Option<u64>,
}

/// A recent dialog as listed by `GET /api/chats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatInfo {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// `GET /api/chats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatsResponse {
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub chats: Vec<ChatInfo>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub reconquest_map_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// `POST /api/send-message`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessageRequest {
    #[serde(serialize_with = "chat_id_value")]
    pub chat_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub status: ActionStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub message_id: Option<String>,
}

/// Telegram ids arrive as JSON numbers; accept strings too and keep them as text.
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Numeric chat ids go out as numbers, anything else (usernames) as strings.
fn chat_id_value<S>(chat_id: &str, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match chat_id.trim().parse::<i64>() {
        Ok(id) => serializer.serialize_i64(id),
        Err(_) => serializer.serialize_str(chat_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_tolerates_null_user_fields() {
        let status: StatusResponse = serde_json::from_value(json!({
            "connected": false,
            "user_info": {"first_name": null, "id": null},
            "current_session": null,
            "auto_clear_logs": true,
            "auto_clear_interval": 300
        }))
        .unwrap();

        assert!(!status.connected);
        assert_eq!(status.user_info.as_ref().and_then(UserInfo::label), None);
        assert_eq!(status.auto_clear_interval, Some(300));
    }

    #[test]
    fn user_label_formats_numeric_id() {
        let user: UserInfo =
            serde_json::from_value(json!({"first_name": "Ana", "id": 123456789})).unwrap();
        assert_eq!(user.label().as_deref(), Some("Ana (ID: 123456789)"));
    }

    #[test]
    fn auto_clear_request_sends_a_single_field() {
        let toggle = serde_json::to_value(AutoClearRequest::toggle(false)).unwrap();
        assert_eq!(toggle, json!({"enabled": false}));

        let interval = serde_json::to_value(AutoClearRequest::interval(12)).unwrap();
        assert_eq!(interval, json!({"interval": 12}));
    }

    #[test]
    fn connect_request_keeps_null_phone() {
        let body = serde_json::to_value(ConnectRequest {
            session_name: "work".into(),
            phone: None,
        })
        .unwrap();
        assert_eq!(body, json!({"session_name": "work", "phone": null}));
    }

    #[test]
    fn chats_response_reads_numeric_group_id() {
        let chats: ChatsResponse = serde_json::from_value(json!({
            "status": "success",
            "chats": [{"id": -1001234, "name": "TheReconquestMap", "type": "Channel"}],
            "reconquest_map_id": -1001234
        }))
        .unwrap();

        assert_eq!(chats.status, ActionStatus::Success);
        assert_eq!(chats.reconquest_map_id.as_deref(), Some("-1001234"));
        assert_eq!(chats.chats[0].kind, "Channel");
    }

    #[test]
    fn unknown_action_status_does_not_fail() {
        let reply: ActionResponse =
            serde_json::from_value(json!({"status": "pending", "message": "later"})).unwrap();
        assert_eq!(reply.status, ActionStatus::Unknown);
        assert!(!reply.is_error());
    }

    #[test]
    fn send_message_serializes_numeric_chat_ids_as_numbers() {
        let numeric = serde_json::to_value(SendMessageRequest {
            chat_id: "-1001234".into(),
            message: "hi".into(),
        })
        .unwrap();
        assert_eq!(numeric, json!({"chat_id": -1001234, "message": "hi"}));

        let username = serde_json::to_value(SendMessageRequest {
            chat_id: "@someone".into(),
            message: "hi".into(),
        })
        .unwrap();
        assert_eq!(username["chat_id"], json!("@someone"));
    }
}
