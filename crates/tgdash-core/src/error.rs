//! Error types for tgdash

use thiserror::Error;

/// Main error type for the dashboard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Required input missing; never reaches the network
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a failure payload
    #[error("{0}")]
    Rejected(String),

    /// The request failed or timed out
    #[error("{0}")]
    Transport(String),

    #[error("Unexpected server payload: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::Malformed(e.to_string())
    }
}

impl From<tgdash_types::ProtocolError> for DashboardError {
    fn from(e: tgdash_types::ProtocolError) -> Self {
        DashboardError::Malformed(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
