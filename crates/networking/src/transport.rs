//! Transport seam for the token exchange.

use crate::client::ClientError;
use async_trait::async_trait;
use common::HeaderMap;
use url::Url;

/// Status and body of a completed POST.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues the single form POST of a token exchange.
///
/// Implementations must not retry; a failure is reported to the caller as is.
#[async_trait]
pub trait TokenTransport: Send + Sync {
    async fn post_form(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: String,
    ) -> Result<TransportResponse, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(TransportResponse::new(200, "{}").is_success());
        assert!(TransportResponse::new(204, "").is_success());
        assert!(!TransportResponse::new(302, "").is_success());
        assert!(!TransportResponse::new(400, "{\"error\":\"invalid_grant\"}").is_success());
    }
}
