//! Configuration shared by the front ends

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Tunables for the controller and its shells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Base URL of the dashboard backend
    pub server_url: String,
    /// Delay between a successful login and closing the connect form
    pub close_delay_ms: u64,
    /// Applied to every HTTP request
    pub request_timeout_secs: u64,
    /// Wait before reopening a dropped event channel
    pub reconnect_delay_ms: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            close_delay_ms: 1500,
            request_timeout_secs: 30,
            reconnect_delay_ms: 3000,
        }
    }
}

impl DashboardConfig {
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Server URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.server_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(DashboardError::Config(format!(
                "server_url must start with http:// or https://, got '{}'",
                self.server_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(DashboardError::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.close_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"server_url": "https://dash.example.com/"}"#).unwrap();
        assert_eq!(config.base_url(), "https://dash.example.com");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn rejects_non_http_urls() {
        let config = DashboardConfig::default().with_server_url("ftp://example.com");
        assert!(matches!(config.validate(), Err(DashboardError::Config(_))));
    }
}
