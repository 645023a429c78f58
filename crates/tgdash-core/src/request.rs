//! HTTP requests issued by the controller and the bookkeeping that matches
//! replies back to them.

use crate::error::{DashboardError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tgdash_types::api::paths;
use tgdash_types::{
    ActionResponse, AutoClearRequest, AutoClearResponse, ChatsResponse, ConnectRequest,
    ConnectResponse, RemoveSessionRequest, SendMessageRequest, SendMessageResponse,
    SessionsResponse, StatusResponse,
};

/// Identifies one HTTP effect; the shell hands it back with the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    FetchStatus,
    FetchSessions,
    FetchLogs,
    Connect(ConnectRequest),
    Disconnect,
    RemoveSession(RemoveSessionRequest),
    ClearLogs,
    ToggleAutoClear(AutoClearRequest),
    FetchChats,
    SendMessage(SendMessageRequest),
}

impl ApiRequest {
    pub fn method(&self) -> Method {
        match self {
            ApiRequest::FetchStatus
            | ApiRequest::FetchSessions
            | ApiRequest::FetchLogs
            | ApiRequest::FetchChats => Method::Get,
            _ => Method::Post,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ApiRequest::FetchStatus => paths::STATUS,
            ApiRequest::FetchSessions => paths::SESSIONS,
            ApiRequest::FetchLogs => paths::LOGS,
            ApiRequest::Connect(_) => paths::CONNECT,
            ApiRequest::Disconnect => paths::DISCONNECT,
            ApiRequest::RemoveSession(_) => paths::REMOVE_SESSION,
            ApiRequest::ClearLogs => paths::CLEAR_LOGS,
            ApiRequest::ToggleAutoClear(_) => paths::TOGGLE_AUTO_CLEAR,
            ApiRequest::FetchChats => paths::CHATS,
            ApiRequest::SendMessage(_) => paths::SEND_MESSAGE,
        }
    }

    /// JSON body, if the endpoint takes one
    pub fn body(&self) -> Result<Option<String>> {
        let body = match self {
            ApiRequest::Connect(request) => serde_json::to_string(request)?,
            ApiRequest::RemoveSession(request) => serde_json::to_string(request)?,
            ApiRequest::ToggleAutoClear(request) => serde_json::to_string(request)?,
            ApiRequest::SendMessage(request) => serde_json::to_string(request)?,
            _ => return Ok(None),
        };
        Ok(Some(body))
    }

    /// Decode a successful response body into the matching reply
    pub fn parse_reply(&self, body: &str) -> Result<ApiReply> {
        Ok(match self {
            ApiRequest::FetchStatus => ApiReply::Status(decode(body)?),
            ApiRequest::FetchSessions => ApiReply::Sessions(decode(body)?),
            ApiRequest::FetchLogs => match decode::<Value>(body)? {
                Value::Array(entries) => ApiReply::Logs(entries),
                other => {
                    return Err(DashboardError::Malformed(format!(
                        "expected a list of log entries, got {}",
                        other
                    )))
                }
            },
            ApiRequest::Connect(_) => ApiReply::Connect(decode(body)?),
            ApiRequest::Disconnect => ApiReply::Disconnect(decode(body)?),
            ApiRequest::RemoveSession(_) => ApiReply::RemoveSession(decode(body)?),
            ApiRequest::ClearLogs => ApiReply::ClearLogs(decode(body)?),
            ApiRequest::ToggleAutoClear(_) => ApiReply::AutoClear(decode(body)?),
            ApiRequest::FetchChats => ApiReply::Chats(decode(body)?),
            ApiRequest::SendMessage(_) => ApiReply::SendMessage(decode(body)?),
        })
    }

    /// Interpret a completed HTTP exchange. Failure statuses still carry the
    /// backend's JSON error payload; only an unreadable body on a failure
    /// status becomes a transport error.
    pub fn interpret(&self, status: u16, body: &str) -> Result<ApiReply> {
        match self.parse_reply(body) {
            Ok(reply) => Ok(reply),
            Err(_) if !(200..300).contains(&status) => Err(DashboardError::Transport(format!(
                "server responded with HTTP {}",
                status
            ))),
            Err(e) => Err(e),
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    Ok(serde_json::from_str(body)?)
}

/// Decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    Status(StatusResponse),
    Sessions(SessionsResponse),
    /// Raw entries; each is resolved into a log line on ingestion
    Logs(Vec<Value>),
    Connect(ConnectResponse),
    Disconnect(ActionResponse),
    RemoveSession(ActionResponse),
    ClearLogs(ActionResponse),
    AutoClear(AutoClearResponse),
    Chats(ChatsResponse),
    SendMessage(SendMessageResponse),
}

/// Requests of the same slot replace each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestSlot {
    Status,
    Sessions,
    Logs,
    /// Connect form submissions; stale ones are also caught by attempt
    Handshake,
    /// Connecting with a stored session from the manage list
    Connect,
    Disconnect,
    Chats,
}

/// Why a request was issued; decides what its reply does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyContext {
    Status { sync: bool },
    Sessions { sync: bool, show_manage: bool },
    Logs { sync: bool },
    HandshakeConnect { attempt: u64 },
    ConnectExisting { session: String },
    Disconnect,
    RemoveSession { session: String },
    ClearLogs,
    AutoClearToggle { enabled: bool },
    AutoClearInterval { minutes: u32 },
    Chats,
    SendMessage,
}

impl ReplyContext {
    pub fn slot(&self) -> Option<RequestSlot> {
        match self {
            ReplyContext::Status { .. } => Some(RequestSlot::Status),
            ReplyContext::Sessions { .. } => Some(RequestSlot::Sessions),
            ReplyContext::Logs { .. } => Some(RequestSlot::Logs),
            ReplyContext::HandshakeConnect { .. } => Some(RequestSlot::Handshake),
            ReplyContext::ConnectExisting { .. } => Some(RequestSlot::Connect),
            ReplyContext::Disconnect => Some(RequestSlot::Disconnect),
            ReplyContext::Chats => Some(RequestSlot::Chats),
            ReplyContext::RemoveSession { .. }
            | ReplyContext::ClearLogs
            | ReplyContext::AutoClearToggle { .. }
            | ReplyContext::AutoClearInterval { .. }
            | ReplyContext::SendMessage => None,
        }
    }

    /// Carry over duties of a superseded request of the same slot, so a
    /// refresh does not drop a pending sync step or manage-modal opening.
    fn absorb(&mut self, old: &ReplyContext) {
        match (self, old) {
            (ReplyContext::Status { sync }, ReplyContext::Status { sync: old_sync })
            | (ReplyContext::Logs { sync }, ReplyContext::Logs { sync: old_sync }) => {
                *sync |= *old_sync;
            }
            (
                ReplyContext::Sessions { sync, show_manage },
                ReplyContext::Sessions {
                    sync: old_sync,
                    show_manage: old_show,
                },
            ) => {
                *sync |= *old_sync;
                *show_manage |= *old_show;
            }
            _ => {}
        }
    }
}

/// Requests still waiting for a reply
#[derive(Debug, Clone, Default)]
pub struct PendingRequests {
    next_id: u64,
    pending: HashMap<RequestId, ReplyContext>,
    by_slot: HashMap<RequestSlot, RequestId>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id, superseding any pending request in the same slot
    pub fn issue(&mut self, mut context: ReplyContext) -> RequestId {
        self.next_id += 1;
        let id = RequestId(self.next_id);

        if let Some(slot) = context.slot() {
            if let Some(old_id) = self.by_slot.insert(slot, id) {
                if let Some(old) = self.pending.remove(&old_id) {
                    tracing::debug!("request {} superseded by {}", old_id, id);
                    context.absorb(&old);
                }
            }
        }

        self.pending.insert(id, context);
        id
    }

    /// Take the context for a reply; `None` for unknown or superseded ids
    pub fn resolve(&mut self, id: RequestId) -> Option<ReplyContext> {
        let context = self.pending.remove(&id)?;
        if let Some(slot) = context.slot() {
            if self.by_slot.get(&slot) == Some(&id) {
                self.by_slot.remove(&slot);
            }
        }
        Some(context)
    }

    pub fn is_pending(&self, id: RequestId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn slot_pending(&self, slot: RequestSlot) -> bool {
        self.by_slot.contains_key(&slot)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgdash_types::ActionStatus;

    #[test]
    fn routes_and_bodies() {
        assert_eq!(ApiRequest::FetchStatus.method(), Method::Get);
        assert_eq!(ApiRequest::FetchStatus.body().unwrap(), None);

        let toggle = ApiRequest::ToggleAutoClear(AutoClearRequest::toggle(true));
        assert_eq!(toggle.method(), Method::Post);
        assert_eq!(toggle.path(), "/api/toggle-auto-clear");
        assert_eq!(toggle.body().unwrap().as_deref(), Some(r#"{"enabled":true}"#));
    }

    #[test]
    fn logs_reply_must_be_a_list() {
        let reply = ApiRequest::FetchLogs
            .parse_reply(r#"["a", {"message": "b", "type": "info"}]"#)
            .unwrap();
        assert!(matches!(reply, ApiReply::Logs(ref entries) if entries.len() == 2));

        assert!(matches!(
            ApiRequest::FetchLogs.parse_reply(r#"{"error": "nope"}"#),
            Err(DashboardError::Malformed(_))
        ));
    }

    #[test]
    fn error_status_with_json_body_is_a_reply() {
        let reply = ApiRequest::Disconnect
            .interpret(500, r#"{"status": "error", "message": "not connected"}"#)
            .unwrap();
        match reply {
            ApiReply::Disconnect(action) => {
                assert_eq!(action.status, ActionStatus::Error);
                assert_eq!(action.message.as_deref(), Some("not connected"));
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        assert!(matches!(
            ApiRequest::Disconnect.interpret(502, "<html>Bad Gateway</html>"),
            Err(DashboardError::Transport(_))
        ));
        assert!(matches!(
            ApiRequest::Disconnect.interpret(200, "not json"),
            Err(DashboardError::Malformed(_))
        ));
    }

    #[test]
    fn same_slot_supersedes() {
        let mut pending = PendingRequests::new();
        let first = pending.issue(ReplyContext::Chats);
        let second = pending.issue(ReplyContext::Chats);

        assert!(!pending.is_pending(first));
        assert_eq!(pending.resolve(first), None);
        assert_eq!(pending.resolve(second), Some(ReplyContext::Chats));
        assert!(!pending.slot_pending(RequestSlot::Chats));
    }

    #[test]
    fn form_connect_and_stored_session_connect_do_not_collide() {
        let mut pending = PendingRequests::new();
        let form = pending.issue(ReplyContext::HandshakeConnect { attempt: 1 });
        let stored = pending.issue(ReplyContext::ConnectExisting {
            session: "B".into(),
        });

        assert!(pending.is_pending(form));
        assert!(pending.is_pending(stored));
        assert!(pending.slot_pending(RequestSlot::Handshake));
        assert!(pending.slot_pending(RequestSlot::Connect));
    }

    #[test]
    fn superseding_keeps_sync_and_manage_duties() {
        let mut pending = PendingRequests::new();
        pending.issue(ReplyContext::Sessions {
            sync: true,
            show_manage: false,
        });
        let latest = pending.issue(ReplyContext::Sessions {
            sync: false,
            show_manage: true,
        });

        assert_eq!(
            pending.resolve(latest),
            Some(ReplyContext::Sessions {
                sync: true,
                show_manage: true,
            })
        );
    }

    #[test]
    fn slotless_requests_coexist() {
        let mut pending = PendingRequests::new();
        let a = pending.issue(ReplyContext::RemoveSession {
            session: "a".into(),
        });
        let b = pending.issue(ReplyContext::RemoveSession {
            session: "b".into(),
        });
        assert_eq!(pending.len(), 2);
        assert!(pending.resolve(a).is_some());
        assert!(pending.resolve(b).is_some());
        assert!(pending.is_empty());
    }
}
