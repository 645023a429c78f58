//! tgdash Types - Pure type definitions for WASM compatibility
//!
//! Wire types shared by the dashboard controller and its front ends: HTTP
//! payloads, event-channel events, log line ingestion and the Socket.IO
//! text framing. No async runtime dependencies, so the crate builds for
//! `wasm32-unknown-unknown` as well as native targets.

pub mod api;
pub mod error;
pub mod event;
pub mod log_line;
pub mod socketio;

pub use api::*;
pub use error::*;
pub use event::*;
pub use log_line::*;
pub use socketio::{SocketIoSession, ChannelSignal};
