//! HTTP client for the dashboard backend

use anyhow::{Context, Result};
use reqwest::Client as ReqwestClient;
use tgdash_core::{ApiReply, ApiRequest, DashboardConfig, DashboardError, Method};

#[derive(Clone)]
pub struct ApiClient {
    http: ReqwestClient,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let http = ReqwestClient::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one controller request and decode the reply
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiReply, DashboardError> {
        let url = format!("{}{}", self.base_url, request.path());

        let builder = match request.method() {
            Method::Get => self.http.get(&url),
            Method::Post => self.http.post(&url),
        };
        let builder = match request.body()? {
            Some(body) => builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
            None => builder,
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        tracing::debug!("{} {} -> {}", request.method().as_str(), url, status);
        request.interpret(status.as_u16(), &body)
    }
}

fn transport_error(e: reqwest::Error) -> DashboardError {
    if e.is_timeout() {
        DashboardError::Transport("request timed out".to_string())
    } else if e.is_connect() {
        DashboardError::Transport(format!("could not reach server: {}", e))
    } else {
        DashboardError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tgdash_types::{ConnectRequest, RemoveSessionRequest};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ApiClient {
        let config = DashboardConfig::default().with_server_url(server.uri());
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn decodes_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "connected": true,
                "user_info": { "first_name": "Ann", "id": 42 },
                "current_session": "main",
                "auto_clear_interval": 600
            })))
            .mount(&server)
            .await;

        match client(&server).execute(&ApiRequest::FetchStatus).await {
            Ok(ApiReply::Status(status)) => {
                assert!(status.connected);
                assert_eq!(status.user_info.and_then(|u| u.id).as_deref(), Some("42"));
                assert_eq!(status.auto_clear_interval, Some(600));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn posts_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/connect"))
            .and(body_json(json!({ "session_name": "main", "phone": null })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ApiRequest::Connect(ConnectRequest {
            session_name: "main".into(),
            phone: None,
        });
        let reply = client(&server).execute(&request).await.unwrap();
        assert!(matches!(reply, ApiReply::Connect(c) if c.success));
    }

    #[tokio::test]
    async fn failure_status_with_json_is_still_a_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/remove-session"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "status": "error",
                "message": "session is in use"
            })))
            .mount(&server)
            .await;

        let request = ApiRequest::RemoveSession(RemoveSessionRequest {
            session_name: "main".into(),
        });
        match client(&server).execute(&request).await {
            Ok(ApiReply::RemoveSession(action)) => {
                assert!(action.is_error());
                assert_eq!(action.message.as_deref(), Some("session is in use"));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[tokio::test]
    async fn html_error_page_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/sessions"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let result = client(&server).execute(&ApiRequest::FetchSessions).await;
        assert_eq!(
            result,
            Err(DashboardError::Transport(
                "server responded with HTTP 502".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/chats"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "status": "success" }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut config = DashboardConfig::default().with_server_url(server.uri());
        config.request_timeout_secs = 1;
        let client = ApiClient::new(&config).unwrap();

        let result = client.execute(&ApiRequest::FetchChats).await;
        assert_eq!(
            result,
            Err(DashboardError::Transport("request timed out".to_string()))
        );
    }
}
