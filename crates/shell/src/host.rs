//! Collaborator seam to the platform shell.
//!
//! The gateway never owns surfaces; it asks the host to create, close and
//! navigate them.

use common::SurfaceId;
use thiserror::Error;
use url::Url;

/// Host errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("Surface could not be created: {0}")]
    SurfaceCreation(String),
    #[error("Interactive surfaces are not available")]
    Unsupported,
}

/// Outbound operations the gateway needs from the platform.
pub trait ShellHost: Send + Sync {
    /// Create a visible transient interactive surface showing `url`.
    ///
    /// Implementations may report the new surface's close through
    /// `Gateway::surface_closed` before returning.
    fn open_transient_surface(&self, url: &Url) -> Result<SurfaceId, HostError>;

    /// Close a surface previously created by the host.
    fn close_surface(&self, surface: SurfaceId);

    /// Point the primary surface at a static local resource.
    fn navigate_primary(&self, url: &Url);

    /// Hand a URL to the user's default browser.
    fn open_external(&self, url: &Url);
}

/// Headless host that only logs what a real shell would do.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingHost;

impl ShellHost for LoggingHost {
    fn open_transient_surface(&self, url: &Url) -> Result<SurfaceId, HostError> {
        tracing::warn!(url = %url, "Headless host cannot open interactive surfaces");
        Err(HostError::Unsupported)
    }

    fn close_surface(&self, surface: SurfaceId) {
        tracing::info!(%surface, "Would close surface");
    }

    fn navigate_primary(&self, url: &Url) {
        tracing::info!(url = %url, "Would navigate primary surface");
    }

    fn open_external(&self, url: &Url) {
        tracing::info!(url = %url, "Would open in external browser");
    }
}
