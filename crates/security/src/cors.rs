//! Development-only CORS override.
//!
//! A webapp served from a local dev server talks to the staging backend,
//! which only allows its own origins. When running against localhost the
//! shell rewrites the backend's CORS response headers so the local origin is
//! accepted with credentials.

use common::headers::names;
use common::HeaderMap;

/// Backend whose responses are rewritten.
pub const STAGING_BACKEND: &str = "https://staging-nginz-https.zinfra.io/";
/// Origin of the local development server.
pub const LOCALHOST_ORIGIN: &str = "http://localhost:8080";

/// Rewrites CORS response headers for one backend.
#[derive(Clone, Debug)]
pub struct DevCorsOverride {
    /// URL prefix of the backend.
    backend_prefix: String,
    /// Origin written into `Access-Control-Allow-Origin`.
    allow_origin: String,
}

impl DevCorsOverride {
    pub fn new(backend_prefix: impl Into<String>, allow_origin: impl Into<String>) -> Self {
        Self {
            backend_prefix: backend_prefix.into(),
            allow_origin: allow_origin.into(),
        }
    }

    /// Override for the local dev server against the staging backend.
    pub fn localhost() -> Self {
        Self::new(STAGING_BACKEND, LOCALHOST_ORIGIN)
    }

    /// Check whether a response URL is covered.
    pub fn applies_to(&self, response_url: &str) -> bool {
        response_url.starts_with(&self.backend_prefix)
    }

    /// Rewrite the headers of a covered response. Returns whether anything changed.
    pub fn apply(&self, response_url: &str, headers: &mut HeaderMap) -> bool {
        if !self.applies_to(response_url) {
            return false;
        }

        headers.insert(names::ACCESS_CONTROL_ALLOW_ORIGIN, self.allow_origin.as_str());
        headers.insert(names::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
        tracing::trace!(url = response_url, origin = %self.allow_origin, "Overrode CORS response headers");
        true
    }
}
