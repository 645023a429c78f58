//! Wire decoding errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Empty frame")]
    EmptyFrame,

    #[error("Unknown engine packet type: {0}")]
    UnknownEnginePacket(char),

    #[error("Unknown socket packet type: {0}")]
    UnknownSocketPacket(char),

    #[error("Malformed event frame: {0}")]
    MalformedEvent(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Malformed payload for '{event}': {reason}")]
    MalformedPayload { event: String, reason: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
