//! Same-origin matching against the shell's trusted base URL.
//!
//! The shell trusts exactly one origin, the scheme and hostname of its
//! configured web application. Ports, paths, queries and fragments play no
//! part in the comparison.

use std::fmt;
use thiserror::Error;
use url::Url;

/// Errors raised while deriving the trusted origin at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OriginError {
    #[error("Malformed base URL: {0}")]
    Malformed(#[from] url::ParseError),
    #[error("Base URL has no host: {0}")]
    MissingHost(String),
}

/// The scheme and hostname of the application's base URL.
///
/// Derived once at startup and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TrustedOrigin {
    scheme: String,
    host: String,
}

impl TrustedOrigin {
    /// Create a trusted origin from components.
    pub fn new(scheme: &str, host: &str) -> Self {
        Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_ascii_lowercase(),
        }
    }

    /// Derive the trusted origin from an already parsed URL.
    pub fn from_url(url: &Url) -> Result<Self, OriginError> {
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| OriginError::MissingHost(url.to_string()))?;
        Ok(Self::new(url.scheme(), host))
    }

    /// Parse the configured base URL.
    pub fn parse(base_url: &str) -> Result<Self, OriginError> {
        let url = Url::parse(base_url)?;
        Self::from_url(&url)
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Check whether a candidate URL belongs to this origin.
    pub fn matches(&self, candidate: &str) -> bool {
        is_same_origin(candidate, self)
    }

    /// Check whether a parsed URL belongs to this origin.
    pub fn matches_url(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => {
                url.scheme().eq_ignore_ascii_case(&self.scheme)
                    && host.eq_ignore_ascii_case(&self.host)
            }
            None => false,
        }
    }
}

impl fmt::Display for TrustedOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.host)
    }
}

/// Decide whether `candidate_url` shares scheme and hostname with `trusted`.
///
/// A URL that fails to parse, or that has no host (`data:`, `about:blank`),
/// is never same-origin.
pub fn is_same_origin(candidate_url: &str, trusted: &TrustedOrigin) -> bool {
    match Url::parse(candidate_url) {
        Ok(url) => trusted.matches_url(&url),
        Err(err) => {
            tracing::debug!(url = candidate_url, error = %err, "Malformed URL treated as untrusted");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire() -> TrustedOrigin {
        TrustedOrigin::parse("https://app.wire.com").unwrap()
    }

    #[test]
    fn test_origin_from_base_url() {
        let origin = TrustedOrigin::parse("https://wire-webapp-staging.wire.com/?env=prod").unwrap();
        assert_eq!(origin.scheme(), "https");
        assert_eq!(origin.host(), "wire-webapp-staging.wire.com");
        assert_eq!(origin.to_string(), "https://wire-webapp-staging.wire.com");
    }

    #[test]
    fn test_base_url_without_host() {
        assert!(matches!(
            TrustedOrigin::parse("data:text/plain,hello"),
            Err(OriginError::MissingHost(_))
        ));
        assert!(matches!(TrustedOrigin::parse("::"), Err(OriginError::Malformed(_))));
    }

    #[test]
    fn test_same_origin_ignores_path_query_fragment_and_port() {
        let origin = wire();
        assert!(is_same_origin("https://app.wire.com/x", &origin));
        assert!(is_same_origin("https://app.wire.com/y?hl=en#conversation", &origin));
        assert!(is_same_origin("https://app.wire.com:8443/", &origin));
    }

    #[test]
    fn test_same_origin_is_case_insensitive() {
        let origin = TrustedOrigin::new("HTTPS", "App.Wire.COM");
        assert!(is_same_origin("https://APP.wire.com/", &origin));
        assert!(is_same_origin("HTTPS://app.wire.com/", &origin));
    }

    #[test]
    fn test_scheme_must_match_exactly() {
        let origin = wire();
        assert!(!is_same_origin("http://app.wire.com/", &origin));
        assert!(!is_same_origin("wss://app.wire.com/", &origin));
    }

    #[test]
    fn test_different_host_is_rejected() {
        let origin = wire();
        assert!(!is_same_origin("https://evil.example/login", &origin));
        assert!(!is_same_origin("https://app.wire.com.evil.example/", &origin));
        assert!(!is_same_origin("https://sub.app.wire.com/", &origin));
    }

    #[test]
    fn test_malformed_or_hostless_urls_are_untrusted() {
        let origin = wire();
        assert!(!is_same_origin("", &origin));
        assert!(!is_same_origin("not a url", &origin));
        assert!(!is_same_origin("https://", &origin));
        assert!(!is_same_origin("about:blank", &origin));
        assert!(!is_same_origin("javascript:alert(1)", &origin));
    }
}
