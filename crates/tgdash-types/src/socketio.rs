//! Socket.IO v5 over the Engine.IO v4 WebSocket transport
//!
//! Only what the dashboard needs: the default namespace, text frames,
//! heartbeat replies and named events. Frame I/O stays with the caller;
//! [`SocketIoSession::receive`] turns one inbound frame into the frames to
//! send back and the signals to hand to the controller.

use crate::error::{ProtocolError, Result};
use crate::event::{ClientEvent, ServerEvent};
use serde::Deserialize;
use serde_json::{json, Value};

const DEFAULT_NAMESPACE: &str = "/";

/// Path and query of the WebSocket endpoint
pub const SOCKET_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Build the WebSocket URL from the HTTP base URL of the backend
pub fn socket_url(server_url: &str) -> String {
    let base = server_url
        .trim_end_matches('/')
        .replace("https://", "wss://")
        .replace("http://", "ws://");
    format!("{}{}", base, SOCKET_PATH)
}

/// Engine.IO open packet payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// Socket.IO packet carried inside an Engine.IO message
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect { namespace: String, data: Option<Value> },
    Disconnect { namespace: String },
    Event { namespace: String, name: String, args: Vec<Value> },
    Ack { namespace: String },
    ConnectError { namespace: String, data: Option<Value> },
    Binary { namespace: String },
}

impl SocketPacket {
    pub fn parse(body: &str) -> Result<Self> {
        let kind = body.chars().next().ok_or(ProtocolError::EmptyFrame)?;
        let rest = &body[kind.len_utf8()..];

        // Binary packets carry an attachment count terminated by '-'
        let rest = match kind {
            '5' | '6' => rest.find('-').map(|i| &rest[i + 1..]).unwrap_or(rest),
            _ => rest,
        };

        let (namespace, rest) = if rest.starts_with('/') {
            match rest.find(',') {
                Some(i) => (&rest[..i], &rest[i + 1..]),
                None => (rest, ""),
            }
        } else {
            (DEFAULT_NAMESPACE, rest)
        };
        let namespace = namespace.to_string();

        let ack_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let rest = &rest[ack_end..];

        let data: Option<Value> = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest)?)
        };

        match kind {
            '0' => Ok(SocketPacket::Connect { namespace, data }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let mut args = match data {
                    Some(Value::Array(items)) => items,
                    other => {
                        return Err(ProtocolError::MalformedEvent(format!(
                            "expected an array, got {:?}",
                            other
                        )))
                    }
                };
                if args.is_empty() {
                    return Err(ProtocolError::MalformedEvent("missing event name".into()));
                }
                let name = match args.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(ProtocolError::MalformedEvent(format!(
                            "event name is not a string: {}",
                            other
                        )))
                    }
                };
                Ok(SocketPacket::Event {
                    namespace,
                    name,
                    args,
                })
            }
            '3' => Ok(SocketPacket::Ack { namespace }),
            '4' => Ok(SocketPacket::ConnectError { namespace, data }),
            '5' | '6' => Ok(SocketPacket::Binary { namespace }),
            other => Err(ProtocolError::UnknownSocketPacket(other)),
        }
    }

    fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace }
            | SocketPacket::ConnectError { namespace, .. }
            | SocketPacket::Binary { namespace } => namespace,
        }
    }
}

/// What the controller needs to hear about
#[derive(Debug)]
pub enum ChannelSignal {
    Connected,
    Disconnected { reason: String },
    Event(Result<ServerEvent>),
}

/// Outcome of one inbound frame
#[derive(Debug, Default)]
pub struct Incoming {
    pub replies: Vec<String>,
    pub signals: Vec<ChannelSignal>,
}

/// Client side of one Engine.IO connection
#[derive(Debug, Default)]
pub struct SocketIoSession {
    sid: Option<String>,
    ping_interval_ms: u64,
    joined: bool,
}

impl SocketIoSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.joined
    }

    pub fn sid(&self) -> Option<&str> {
        self.sid.as_deref()
    }

    pub fn ping_interval_ms(&self) -> u64 {
        self.ping_interval_ms
    }

    /// Process one text frame received on the WebSocket
    pub fn receive(&mut self, frame: &str) -> Result<Incoming> {
        let kind = frame.chars().next().ok_or(ProtocolError::EmptyFrame)?;
        let body = &frame[kind.len_utf8()..];
        let mut incoming = Incoming::default();

        match kind {
            '0' => {
                let open: OpenHandshake = serde_json::from_str(body)?;
                self.sid = Some(open.sid);
                self.ping_interval_ms = open.ping_interval;
                incoming.replies.push("40".to_string());
            }
            '1' => {
                self.joined = false;
                incoming.signals.push(ChannelSignal::Disconnected {
                    reason: "transport closed by server".to_string(),
                });
            }
            '2' => incoming.replies.push(format!("3{}", body)),
            '3' | '5' | '6' => {}
            '4' => self.receive_packet(SocketPacket::parse(body)?, &mut incoming),
            other => return Err(ProtocolError::UnknownEnginePacket(other)),
        }

        Ok(incoming)
    }

    fn receive_packet(&mut self, packet: SocketPacket, incoming: &mut Incoming) {
        if packet.namespace() != DEFAULT_NAMESPACE {
            return;
        }

        match packet {
            SocketPacket::Connect { .. } => {
                self.joined = true;
                incoming.signals.push(ChannelSignal::Connected);
            }
            SocketPacket::Disconnect { .. } => {
                self.joined = false;
                incoming.signals.push(ChannelSignal::Disconnected {
                    reason: "namespace disconnected by server".to_string(),
                });
            }
            SocketPacket::ConnectError { data, .. } => {
                self.joined = false;
                let reason = data
                    .as_ref()
                    .and_then(|d| d.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("connection refused")
                    .to_string();
                incoming.signals.push(ChannelSignal::Disconnected { reason });
            }
            SocketPacket::Event { name, args, .. } => {
                incoming
                    .signals
                    .push(ChannelSignal::Event(ServerEvent::decode(&name, args.first())));
            }
            SocketPacket::Ack { .. } | SocketPacket::Binary { .. } => {}
        }
    }

    /// Frame for an outbound event on the default namespace
    pub fn encode_event(event: &ClientEvent) -> String {
        format!("42{}", json!([event.name(), event.payload()]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log_line::LogLine;

    const OPEN: &str =
        r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#;

    #[test]
    fn socket_url_swaps_scheme() {
        assert_eq!(
            socket_url("http://localhost:5000/"),
            "ws://localhost:5000/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            socket_url("https://dash.example.com"),
            "wss://dash.example.com/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn open_then_connect_joins_namespace() {
        let mut session = SocketIoSession::new();

        let opened = session.receive(OPEN).unwrap();
        assert_eq!(opened.replies, vec!["40".to_string()]);
        assert_eq!(session.sid(), Some("abc"));
        assert_eq!(session.ping_interval_ms(), 25000);
        assert!(!session.is_connected());

        let joined = session.receive(r#"40{"sid":"xyz"}"#).unwrap();
        assert!(matches!(joined.signals.as_slice(), [ChannelSignal::Connected]));
        assert!(session.is_connected());
    }

    #[test]
    fn ping_is_answered_with_pong() {
        let mut session = SocketIoSession::new();
        let incoming = session.receive("2").unwrap();
        assert_eq!(incoming.replies, vec!["3".to_string()]);
        assert!(incoming.signals.is_empty());
    }

    #[test]
    fn events_are_decoded_once() {
        let mut session = SocketIoSession::new();
        let incoming = session
            .receive(r#"42["log",{"message":"hello","type":"info"}]"#)
            .unwrap();

        match incoming.signals.as_slice() {
            [ChannelSignal::Event(Ok(ServerEvent::Log(LogLine::Structured { text, .. })))] => {
                assert_eq!(text, "hello")
            }
            other => panic!("unexpected signals: {:?}", other),
        }
    }

    #[test]
    fn event_without_arguments() {
        let mut session = SocketIoSession::new();
        let incoming = session.receive(r#"42["ask_code"]"#).unwrap();
        assert!(matches!(
            incoming.signals.as_slice(),
            [ChannelSignal::Event(Ok(ServerEvent::AskCode))]
        ));
    }

    #[test]
    fn other_namespaces_are_ignored() {
        let mut session = SocketIoSession::new();
        let incoming = session.receive(r#"42/admin,["ask_code"]"#).unwrap();
        assert!(incoming.signals.is_empty());
    }

    #[test]
    fn ack_ids_are_skipped() {
        let packet = SocketPacket::parse(r#"213["log","x"]"#).unwrap();
        assert_eq!(
            packet,
            SocketPacket::Event {
                namespace: "/".into(),
                name: "log".into(),
                args: vec![json!("x")],
            }
        );
    }

    #[test]
    fn server_close_disconnects() {
        let mut session = SocketIoSession::new();
        session.receive("40").unwrap();
        let incoming = session.receive("41").unwrap();
        assert!(matches!(
            incoming.signals.as_slice(),
            [ChannelSignal::Disconnected { .. }]
        ));
        assert!(!session.is_connected());
    }

    #[test]
    fn outbound_event_frame() {
        let frame = SocketIoSession::encode_event(&ClientEvent::CodeResponse {
            code: "12345".into(),
        });
        assert_eq!(frame, r#"42["code_response",{"code":"12345"}]"#);
    }

    #[test]
    fn garbage_frames_are_errors() {
        let mut session = SocketIoSession::new();
        assert!(session.receive("").is_err());
        assert!(session.receive("9").is_err());
        assert!(session.receive("42{not json").is_err());
    }
}
