//! HTTP header handling.

use indexmap::IndexMap;

/// HTTP header map (case-insensitive keys, order-preserving).
///
/// Used both for the token-exchange request and for response headers the
/// platform hands to the gateway before they reach a surface.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderMap {
    headers: IndexMap<String, String>,
}

impl HeaderMap {
    /// Create a new empty header map.
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    /// Insert a header, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.insert(name, value.into());
    }

    /// Get a header value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Iterate over headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Get Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.get(names::CONTENT_TYPE)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

/// Header names the shell reads or rewrites.
pub mod names {
    pub const ACCEPT: &str = "accept";
    pub const ACCESS_CONTROL_ALLOW_CREDENTIALS: &str = "access-control-allow-credentials";
    pub const ACCESS_CONTROL_ALLOW_ORIGIN: &str = "access-control-allow-origin";
    pub const CONTENT_TYPE: &str = "content-type";
}

/// Content type utilities.
pub mod content_type {
    pub const JSON: &str = "application/json";
    pub const FORM: &str = "application/x-www-form-urlencoded";

    /// Check if content type is JSON.
    pub fn is_json(content_type: &str) -> bool {
        content_type.starts_with(JSON) || content_type.ends_with("+json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map() {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "application/json");
        headers.insert("Accept", "application/json");

        assert_eq!(headers.get("content-type"), Some("application/json"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_insert_replaces_case_insensitively() {
        let mut headers: HeaderMap =
            [("Access-Control-Allow-Origin", "https://app.wire.com")].into_iter().collect();
        headers.insert("access-control-allow-origin", "http://localhost:8080");

        assert_eq!(headers.len(), 1);
        assert_eq!(
            headers.get(names::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn test_content_type_detection() {
        assert!(content_type::is_json("application/json; charset=utf-8"));
        assert!(content_type::is_json("application/problem+json"));
        assert!(!content_type::is_json(content_type::FORM));
    }
}
