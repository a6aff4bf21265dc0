//! Navigation and attach guarding.
//!
//! Embedded surfaces may only show the trusted origin. The primary surface
//! never leaves its bootstrap document. Links that are refused in-app are
//! handed to the external browser when that is safe to do.

use crate::origin::TrustedOrigin;
use crate::sandbox::{SurfaceAttachRequest, SurfaceHardener};
use common::SurfaceKind;
use url::Url;

/// Schemes that may be handed to the external browser.
const EXTERNAL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// What kind of navigation the platform reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationKind {
    /// The surface is about to replace its own document.
    InPlace,
    /// The surface asked for a new window or tab.
    NewWindow {
        /// Surface whose script triggered the request.
        initiated_by: SurfaceKind,
    },
}

/// A navigation reported by the platform.
#[derive(Clone, Debug)]
pub struct NavigationAttempt {
    pub surface: SurfaceKind,
    pub kind: NavigationKind,
    pub target_url: String,
}

impl NavigationAttempt {
    /// In-place navigation of `surface`.
    pub fn in_place(surface: SurfaceKind, target_url: impl Into<String>) -> Self {
        Self {
            surface,
            kind: NavigationKind::InPlace,
            target_url: target_url.into(),
        }
    }

    /// New-window request on `surface` triggered from `initiated_by`.
    pub fn new_window(surface: SurfaceKind, initiated_by: SurfaceKind, target_url: impl Into<String>) -> Self {
        Self {
            surface,
            kind: NavigationKind::NewWindow { initiated_by },
            target_url: target_url.into(),
        }
    }
}

/// Outcome of a navigation check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavigationVerdict {
    /// Let the surface navigate.
    Proceed,
    /// Cancel and do nothing else.
    Cancel,
    /// Cancel and open the URL in the external browser.
    OpenExternally(Url),
}

impl NavigationVerdict {
    pub fn is_cancelled(&self) -> bool {
        !matches!(self, NavigationVerdict::Proceed)
    }
}

/// Outcome of an attach check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachVerdict {
    Allow,
    Veto,
}

/// Guards embedded surfaces against leaving the trusted origin.
#[derive(Clone, Debug)]
pub struct NavigationGuard {
    origin: TrustedOrigin,
    hardener: SurfaceHardener,
}

impl NavigationGuard {
    pub fn new(origin: TrustedOrigin) -> Self {
        Self {
            origin,
            hardener: SurfaceHardener::new(),
        }
    }

    pub fn origin(&self) -> &TrustedOrigin {
        &self.origin
    }

    /// Harden an attach request, then decide whether it may load.
    ///
    /// Hardening happens before the origin check so that a vetoed request
    /// is never left with permissive preferences.
    pub fn check_attach(&self, request: &mut SurfaceAttachRequest) -> AttachVerdict {
        self.hardener.harden_request(request);

        if self.origin.matches(request.target_url()) {
            tracing::debug!(url = request.target_url(), "Attaching embedded surface");
            AttachVerdict::Allow
        } else {
            tracing::warn!(url = request.target_url(), "Prevented an unauthorized embedded surface");
            AttachVerdict::Veto
        }
    }

    /// Decide what happens to a navigation.
    pub fn check_navigation(&self, attempt: &NavigationAttempt) -> NavigationVerdict {
        match (attempt.surface, attempt.kind) {
            (SurfaceKind::Primary, NavigationKind::NewWindow { initiated_by: SurfaceKind::Embedded }) => {
                tracing::debug!(url = %attempt.target_url, "New window was requested from an embedded surface, ignoring");
                NavigationVerdict::Cancel
            }
            (SurfaceKind::Primary, _) => {
                tracing::debug!(url = %attempt.target_url, "Preventing navigation of the primary surface");
                self.external(&attempt.target_url)
            }
            (SurfaceKind::Embedded, NavigationKind::NewWindow { .. }) => {
                tracing::debug!(url = %attempt.target_url, "Opening a new window from an embedded surface externally");
                self.external(&attempt.target_url)
            }
            (SurfaceKind::Embedded, NavigationKind::InPlace) => {
                if self.origin.matches(&attempt.target_url) {
                    tracing::debug!(url = %attempt.target_url, "Navigating inside embedded surface");
                    NavigationVerdict::Proceed
                } else {
                    tracing::warn!(url = %attempt.target_url, "Preventing navigation inside embedded surface");
                    self.external(&attempt.target_url)
                }
            }
        }
    }

    fn external(&self, target_url: &str) -> NavigationVerdict {
        match Url::parse(target_url) {
            Ok(url) if EXTERNAL_SCHEMES.contains(&url.scheme()) => NavigationVerdict::OpenExternally(url),
            _ => {
                tracing::warn!(url = target_url, "Refusing to open URL externally");
                NavigationVerdict::Cancel
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::SurfacePreferences;

    fn guard() -> NavigationGuard {
        NavigationGuard::new(TrustedOrigin::parse("https://app.wire.com").unwrap())
    }

    #[test]
    fn test_attach_unauthorized_origin_is_vetoed_and_hardened() {
        let mut request = SurfaceAttachRequest::new("https://evil.example/login", SurfacePreferences::all());
        assert_eq!(guard().check_attach(&mut request), AttachVerdict::Veto);
        assert!(request.is_hardened());
        assert!(request.preferences().is_hardened());
    }

    #[test]
    fn test_attach_trusted_origin_is_allowed() {
        let mut request = SurfaceAttachRequest::new(
            "https://app.wire.com/?hl=en",
            SurfacePreferences::NATIVE_BRIDGE,
        );
        assert_eq!(guard().check_attach(&mut request), AttachVerdict::Allow);
        assert!(request.preferences().is_hardened());
    }

    #[test]
    fn test_attach_malformed_url_is_vetoed() {
        let mut request = SurfaceAttachRequest::new("::not-a-url", SurfacePreferences::default());
        assert_eq!(guard().check_attach(&mut request), AttachVerdict::Veto);
    }

    #[test]
    fn test_embedded_same_origin_navigation_proceeds() {
        let attempt = NavigationAttempt::in_place(SurfaceKind::Embedded, "https://app.wire.com/y");
        assert_eq!(guard().check_navigation(&attempt), NavigationVerdict::Proceed);
    }

    #[test]
    fn test_embedded_foreign_navigation_opens_externally() {
        let attempt = NavigationAttempt::in_place(SurfaceKind::Embedded, "https://external.example");
        let verdict = guard().check_navigation(&attempt);
        assert!(verdict.is_cancelled());
        assert_eq!(
            verdict,
            NavigationVerdict::OpenExternally(Url::parse("https://external.example").unwrap())
        );
    }

    #[test]
    fn test_primary_navigation_is_always_cancelled() {
        let attempt = NavigationAttempt::in_place(SurfaceKind::Primary, "https://app.wire.com/other");
        assert!(matches!(
            guard().check_navigation(&attempt),
            NavigationVerdict::OpenExternally(_)
        ));
    }

    #[test]
    fn test_primary_new_window_from_embedded_is_ignored() {
        let attempt = NavigationAttempt::new_window(
            SurfaceKind::Primary,
            SurfaceKind::Embedded,
            "https://external.example",
        );
        assert_eq!(guard().check_navigation(&attempt), NavigationVerdict::Cancel);
    }

    #[test]
    fn test_primary_new_window_from_primary_opens_externally() {
        let attempt = NavigationAttempt::new_window(
            SurfaceKind::Primary,
            SurfaceKind::Primary,
            "https://wire.com/privacy",
        );
        assert!(matches!(
            guard().check_navigation(&attempt),
            NavigationVerdict::OpenExternally(_)
        ));
    }

    #[test]
    fn test_embedded_new_window_opens_externally() {
        let attempt = NavigationAttempt::new_window(
            SurfaceKind::Embedded,
            SurfaceKind::Embedded,
            "mailto:support@wire.com",
        );
        assert!(matches!(
            guard().check_navigation(&attempt),
            NavigationVerdict::OpenExternally(_)
        ));
    }

    #[test]
    fn test_dangerous_schemes_are_never_opened_externally() {
        for target in ["file:///etc/passwd", "javascript:alert(1)", "not a url"] {
            let attempt = NavigationAttempt::in_place(SurfaceKind::Embedded, target);
            assert_eq!(guard().check_navigation(&attempt), NavigationVerdict::Cancel);
        }
    }
}
