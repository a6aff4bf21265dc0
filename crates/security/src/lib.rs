//! Trust-boundary policy for embedded web content.
//!
//! This crate implements the decisions the shell makes about remote content:
//! - Same-origin matching against the trusted base origin
//! - Certificate pinning and TLS trust verification
//! - Hardening of embedded surface preferences
//! - Navigation and attach guarding
//! - The development-only CORS header override
//!
//! Every decision is stateless and returned as a value; callers own the
//! side effects (aborting a handshake, cancelling a navigation).

pub mod origin;
pub mod pinning;
pub mod certificate;
pub mod sandbox;
pub mod navigation;
pub mod cors;

pub use origin::{is_same_origin, OriginError, TrustedOrigin};
pub use pinning::{Fingerprint, PeerCertificate, PinEntry, PinError, PinningTable};
pub use certificate::{
    CertificateTrustVerifier, CompletionCode, PlatformVerification, RejectReason, TrustDecision,
    VerificationRequest,
};
pub use sandbox::{SurfaceAttachRequest, SurfaceHardener, SurfacePreferences};
pub use navigation::{AttachVerdict, NavigationAttempt, NavigationGuard, NavigationKind, NavigationVerdict};
pub use cors::DevCorsOverride;
