//! Common error types.

use thiserror::Error;

/// Startup and configuration errors for the shell.
///
/// Trust decisions are never expressed through this type; it only covers
/// failures that happen before the gateway starts handling events.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;

impl ShellError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_error_conversion() {
        let err: ShellError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ShellError::UrlParse(_)));
        assert!(err.to_string().starts_with("URL parse error"));
    }

    #[test]
    fn test_config_helper() {
        let err = ShellError::config("missing base url");
        assert_eq!(err.to_string(), "Configuration error: missing base url");
    }
}
