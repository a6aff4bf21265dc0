//! HTTP client implementation.

use crate::transport::{TokenTransport, TransportResponse};
use async_trait::async_trait;
use common::HeaderMap;
use reqwest::header::{HeaderName, HeaderValue};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// HTTP client errors.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    #[error("Timeout")]
    Timeout,
    #[error("Request error: {0}")]
    Request(String),
    #[error("Response error: {0}")]
    Response(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_builder() {
            ClientError::Request(err.to_string())
        } else {
            ClientError::Response(err.to_string())
        }
    }
}

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connect timeout.
    pub connect_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Refuse plain-http URLs.
    pub https_only: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!(
                "WireShell/{} ({})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS
            ),
            https_only: true,
        }
    }
}

/// HTTP client for the shell's own requests.
pub struct HttpClient {
    /// Inner reqwest client.
    inner: reqwest::Client,
    /// Client configuration.
    config: ClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?,
        );

        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            // Token endpoints answer directly.
            .redirect(reqwest::redirect::Policy::none())
            .https_only(config.https_only)
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Request(e.to_string()))?;

        Ok(Self { inner, config })
    }

    /// POST a body and collect the full response.
    pub async fn post(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: String,
    ) -> Result<TransportResponse, ClientError> {
        if self.config.https_only && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(url.to_string()));
        }

        let mut request = self.inner.post(url.clone());
        for (name, value) in headers.iter() {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ClientError::InvalidHeader(e.to_string()))?;
            request = request.header(name, value);
        }

        let response = request.body(body).send().await?;
        let status = response.status().as_u16();

        let mut response_headers = HeaderMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                response_headers.insert(name.as_str(), v);
            }
        }

        let body = response.text().await?;
        tracing::debug!(url = %url, status, "POST completed");

        Ok(TransportResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

#[async_trait]
impl TokenTransport for HttpClient {
    async fn post_form(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: String,
    ) -> Result<TransportResponse, ClientError> {
        self.post(url, headers, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.https_only);
        assert!(config.user_agent.starts_with("WireShell/"));
    }

    #[test]
    fn test_invalid_user_agent_is_an_error() {
        let config = ClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..ClientConfig::default()
        };
        let result = HttpClient::with_config(config);
        assert!(matches!(result, Err(ClientError::InvalidHeader(_))));
    }

    #[tokio::test]
    async fn test_plain_http_is_refused() {
        let client = HttpClient::new().unwrap();
        let url = Url::parse("http://accounts.example/token").unwrap();
        let result = client.post(&url, &HeaderMap::new(), String::new()).await;
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
