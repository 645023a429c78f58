//! Event channel task
//!
//! Keeps a Socket.IO connection to the backend open, reconnecting after the
//! configured delay, and forwards everything it hears to the runner as
//! controller inputs.

use anyhow::{anyhow, Result};
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tgdash_core::{DashboardConfig, Input};
use tgdash_types::socketio::socket_url;
use tgdash_types::{ChannelSignal, ClientEvent, SocketIoSession};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Owns the background task; dropping it closes the channel
pub struct ChannelHandle {
    outbound: mpsc::UnboundedSender<String>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    pub fn spawn(config: &DashboardConfig, inputs: mpsc::UnboundedSender<Input>) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let url = socket_url(config.base_url());
        let task = tokio::spawn(run(url, config.reconnect_delay(), inputs, outbound_rx));
        Self { outbound, task }
    }

    /// Queue an event for the server
    pub fn emit(&self, event: &ClientEvent) -> Result<()> {
        self.outbound
            .send(SocketIoSession::encode_event(event))
            .map_err(|_| anyhow!("event channel task has stopped"))
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

enum Flow {
    Reconnect,
    Stop,
}

async fn run(
    url: String,
    delay: Duration,
    inputs: mpsc::UnboundedSender<Input>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _)) => {
                debug!("event channel open: {}", url);
                if let Flow::Stop = pump(stream, &inputs, &mut outbound).await {
                    return;
                }
            }
            Err(e) => warn!("Event channel connection failed: {}", e),
        }

        if inputs.is_closed() {
            return;
        }
        info!("Reconnecting event channel in {:?}...", delay);
        tokio::time::sleep(delay).await;
    }
}

/// Moves frames until the connection drops
async fn pump(
    stream: WsStream,
    inputs: &mpsc::UnboundedSender<Input>,
    outbound: &mut mpsc::UnboundedReceiver<String>,
) -> Flow {
    let (mut write, mut read) = stream.split();
    let mut session = SocketIoSession::new();

    let reason = 'frames: loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    let incoming = match session.receive(&text) {
                        Ok(incoming) => incoming,
                        Err(e) => {
                            warn!("Ignoring event channel frame {:?}: {}", text, e);
                            continue 'frames;
                        }
                    };

                    for reply in incoming.replies {
                        if let Err(e) = write.send(Message::Text(reply)).await {
                            break 'frames e.to_string();
                        }
                    }

                    let mut dropped = None;
                    for signal in incoming.signals {
                        if let ChannelSignal::Disconnected { reason } = &signal {
                            dropped = Some(reason.clone());
                        }
                        if inputs.send(Input::from(signal)).is_err() {
                            return Flow::Stop;
                        }
                    }
                    // The server left the namespace; start over on a fresh socket
                    if let Some(reason) = dropped {
                        debug!("event channel dropped: {}", reason);
                        return Flow::Reconnect;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    break 'frames match frame {
                        Some(frame) => format!("closed by server: {}", frame.reason),
                        None => "closed by server".to_string(),
                    };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => break 'frames e.to_string(),
                None => break 'frames "connection ended".to_string(),
            },
            frame = outbound.recv() => match frame {
                Some(frame) => {
                    if let Err(e) = write.send(Message::Text(frame)).await {
                        break 'frames e.to_string();
                    }
                }
                None => return Flow::Stop,
            },
        }
    };

    if session.is_connected() && inputs.send(Input::ChannelDisconnected { reason }).is_err() {
        return Flow::Stop;
    }
    Flow::Reconnect
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgdash_types::{LogLine, ServerEvent};
    use tokio::net::TcpListener;

    const OPEN: &str = r#"0{"sid":"s1","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;

    fn config_for(listener: &TcpListener) -> DashboardConfig {
        let addr = listener.local_addr().unwrap();
        let mut config = DashboardConfig::default().with_server_url(format!("http://{}", addr));
        config.reconnect_delay_ms = 50;
        config
    }

    /// Accept one socket and complete the Engine.IO and namespace handshake
    async fn accept_joined(listener: &TcpListener) -> WebSocketStream<TcpStream> {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
        ws.send(Message::Text(OPEN.into())).await.unwrap();
        let join = ws.next().await.unwrap().unwrap();
        assert_eq!(join, Message::Text("40".into()));
        ws.send(Message::Text(r#"40{"sid":"n1"}"#.into()))
            .await
            .unwrap();
        ws
    }

    #[tokio::test]
    async fn forwards_pushes_and_emits_events() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = config_for(&listener);

        let server = tokio::spawn(async move {
            let mut ws = accept_joined(&listener).await;
            ws.send(Message::Text("2".into())).await.unwrap();
            let pong = ws.next().await.unwrap().unwrap();
            ws.send(Message::Text(r#"42["log","hello"]"#.into()))
                .await
                .unwrap();
            let emitted = ws.next().await.unwrap().unwrap();
            (pong, emitted)
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = ChannelHandle::spawn(&config, tx);

        assert!(matches!(rx.recv().await, Some(Input::ChannelConnected)));
        match rx.recv().await {
            Some(Input::Push(ServerEvent::Log(LogLine::Text(text)))) => assert_eq!(text, "hello"),
            other => panic!("unexpected input: {:?}", other),
        }

        handle
            .emit(&ClientEvent::CodeResponse {
                code: "12345".into(),
            })
            .unwrap();

        let (pong, emitted) = server.await.unwrap();
        assert_eq!(pong, Message::Text("3".into()));
        assert_eq!(
            emitted,
            Message::Text(r#"42["code_response",{"code":"12345"}]"#.into())
        );
    }

    #[tokio::test]
    async fn reports_a_dropped_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = config_for(&listener);

        tokio::spawn(async move {
            let mut ws = accept_joined(&listener).await;
            ws.close(None).await.unwrap();
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _handle = ChannelHandle::spawn(&config, tx);

        assert!(matches!(rx.recv().await, Some(Input::ChannelConnected)));
        assert!(matches!(
            rx.recv().await,
            Some(Input::ChannelDisconnected { .. })
        ));
    }
}
