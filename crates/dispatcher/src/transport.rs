//! ReqwestTransport - HTTP POST delivery

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use tracing::trace;

use contracts::{ContractError, Transport};

use crate::error::DispatcherError;

/// `Transport` backed by a shared reqwest client.
///
/// The client-wide timeout is the only per-request deadline: a hung request
/// holds its worker until it fires.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(request_timeout: Duration) -> Result<Self, DispatcherError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DispatcherError::sink_creation("http", e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn post_json(&self, endpoint: &str, body: Bytes) -> Result<(), ContractError> {
        let body_len = body.len();
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| {
                ContractError::transport(endpoint, e.status().map(|s| s.as_u16()), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContractError::transport(
                endpoint,
                Some(status.as_u16()),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        trace!(endpoint = %endpoint, status = status.as_u16(), body_len = body_len, "POST ok");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_post_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/logs"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"level":"Info"}"#))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let endpoint = format!("{}/logs", server.uri());

        let result = transport
            .post_json(&endpoint, Bytes::from_static(br#"{"level":"Info"}"#))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_post_json_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
        let err = transport
            .post_json(&server.uri(), Bytes::from_static(b"{}"))
            .await
            .unwrap_err();

        match err {
            ContractError::Transport { status, .. } => assert_eq!(status, Some(503)),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_post_json_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new(Duration::from_millis(50)).unwrap();
        let result = transport
            .post_json(&server.uri(), Bytes::from_static(b"{}"))
            .await;

        assert!(matches!(result, Err(ContractError::Transport { .. })));
    }
}
