//! Trust gateway for a desktop shell embedding a remote web application.
//!
//! This crate wires the policy types from `shell_security` to the platform's
//! events:
//! - Attach and navigation guarding of embedded surfaces
//! - TLS verification with certificate pinning
//! - The out-of-band OAuth bridge driven by a transient surface's title
//! - Startup configuration

pub mod config;
pub mod gateway;
pub mod host;
pub mod oauth;
pub mod title_signal;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{Environment, GatewayConfig, OAuthConfig};
pub use gateway::{Gateway, SurfaceBindings};
pub use host::{HostError, LoggingHost, ShellHost};
pub use oauth::{AccessTokenResult, OAuthBridge, OAuthError, OAuthRequest, PendingAuthorization};
pub use title_signal::{SignalStatus, TitleSignal};

/// Shell version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
