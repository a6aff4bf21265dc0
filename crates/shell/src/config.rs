//! Gateway configuration.

use common::{ShellError, ShellResult};
use serde::{Deserialize, Serialize};
use shell_security::{PinEntry, PinningTable, TrustedOrigin};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Deployment the shell points at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Internal,
    Staging,
    Localhost,
}

impl Environment {
    /// Base URL of the web application for this environment.
    pub fn webapp_url(self) -> &'static str {
        match self {
            Environment::Production => "https://app.wire.com",
            Environment::Internal => "https://wire-webapp-staging.wire.com/?env=prod",
            Environment::Staging => "https://wire-webapp-staging.zinfra.io",
            Environment::Localhost => "http://localhost:8080",
        }
    }
}

impl FromStr for Environment {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prod" | "production" => Ok(Environment::Production),
            "internal" => Ok(Environment::Internal),
            "staging" | "dev" => Ok(Environment::Staging),
            "localhost" => Ok(Environment::Localhost),
            other => Err(ShellError::config(format!("unknown environment {:?}", other))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Internal => "internal",
            Environment::Staging => "staging",
            Environment::Localhost => "localhost",
        };
        f.write_str(name)
    }
}

/// Gateway configuration, loaded once at startup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment the shell points at.
    pub environment: Environment,
    /// Overrides the environment's web application URL.
    pub base_url: Option<String>,
    /// Internal webapp URL; its host is exempt from certificate checks.
    pub internal_url: String,
    /// Static page shown after a certificate rejection.
    pub certificate_error_page: String,
    /// Certificate pins.
    pub pins: Vec<PinEntry>,
    /// OAuth provider settings.
    pub oauth: OAuthConfig,
}

impl GatewayConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON configuration document.
    pub fn from_json(json: &str) -> ShellResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> ShellResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Set the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = Some(base_url.to_string());
        self
    }

    /// Add a certificate pin.
    pub fn with_pin(mut self, pin: PinEntry) -> Self {
        self.pins.push(pin);
        self
    }

    /// Effective web application URL.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.webapp_url())
    }

    /// Derive the trusted origin from the base URL.
    pub fn trusted_origin(&self) -> ShellResult<TrustedOrigin> {
        TrustedOrigin::parse(self.base_url()).map_err(|e| ShellError::config(e.to_string()))
    }

    /// Hostname of the internal webapp.
    pub fn internal_host(&self) -> ShellResult<String> {
        let url = Url::parse(&self.internal_url)?;
        url.host_str()
            .map(str::to_string)
            .ok_or_else(|| ShellError::config(format!("internal URL has no host: {}", self.internal_url)))
    }

    /// Build the pinning table.
    pub fn pinning_table(&self) -> PinningTable {
        PinningTable::new(self.pins.iter().cloned())
    }

    pub fn certificate_error_url(&self) -> ShellResult<Url> {
        Ok(Url::parse(&self.certificate_error_page)?)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            base_url: None,
            internal_url: Environment::Internal.webapp_url().to_string(),
            certificate_error_page: "app://shell/html/certificate-error.html".to_string(),
            pins: Vec::new(),
            oauth: OAuthConfig::default(),
        }
    }
}

/// OAuth provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    /// Consent page the transient surface is opened on.
    pub authorization_endpoint: String,
    /// Endpoint the authorization code is exchanged at.
    pub token_endpoint: String,
    /// Out-of-band redirect placeholder; never dereferenced.
    pub redirect_uri: String,
    /// Abort a flow still waiting for the user after this many seconds.
    pub timeout_secs: Option<u64>,
}

impl OAuthConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            scopes: vec!["https://www.googleapis.com/auth/contacts.readonly".to_string()],
            authorization_endpoint: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_endpoint: "https://accounts.google.com/o/oauth2/token".to_string(),
            redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
            timeout_secs: None,
        }
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("authorization_endpoint", &self.authorization_endpoint)
            .field("token_endpoint", &self.token_endpoint)
            .field("redirect_uri", &self.redirect_uri)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
