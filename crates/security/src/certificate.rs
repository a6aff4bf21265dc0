//! TLS trust verification.
//!
//! Evaluated once per handshake on an embedded surface's session. The
//! verifier combines the platform's own chain validation with the pinning
//! table and returns a [`TrustDecision`]; it never aborts a connection itself.

use crate::pinning::{PeerCertificate, PinningTable};
use thiserror::Error;

/// Status string the platform reports for a valid chain.
pub const NET_OK: &str = "net::OK";

/// Outcome of the platform's chain validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformVerification {
    /// The chain validated.
    Ok,
    /// The chain failed validation; carries the platform status.
    Failed(String),
}

impl PlatformVerification {
    /// Map a `net::` status string to a verification outcome.
    pub fn from_net_status(status: &str) -> Self {
        if status == NET_OK {
            PlatformVerification::Ok
        } else {
            PlatformVerification::Failed(status.to_string())
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, PlatformVerification::Ok)
    }
}

/// A single handshake awaiting a trust decision.
#[derive(Clone, Debug)]
pub struct VerificationRequest {
    pub hostname: String,
    pub certificate: PeerCertificate,
    pub verification: PlatformVerification,
}

impl VerificationRequest {
    pub fn new(
        hostname: impl Into<String>,
        certificate: PeerCertificate,
        verification: PlatformVerification,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            certificate,
            verification,
        }
    }
}

/// Why a handshake was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    #[error("Certificate chain for {hostname} failed verification: {status}")]
    CertificateChainFailure { hostname: String, status: String },
    #[error("Certificate pinning failed for {hostname}: {message}")]
    PinMismatch { hostname: String, message: String },
}

/// Trust decision for a handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrustDecision {
    /// Trust the connection.
    Accept,
    /// Abort the connection.
    Reject(RejectReason),
    /// Use whatever the platform decided.
    AcceptWithPlatformDefault,
}

impl TrustDecision {
    pub fn is_reject(&self) -> bool {
        matches!(self, TrustDecision::Reject(_))
    }

    /// Completion code handed back to the platform.
    pub fn completion_code(&self) -> CompletionCode {
        match self {
            TrustDecision::Accept => CompletionCode::Trust,
            TrustDecision::Reject(_) => CompletionCode::Deny,
            TrustDecision::AcceptWithPlatformDefault => CompletionCode::DeferToPlatform,
        }
    }
}

/// Verification completion codes understood by the platform TLS layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum CompletionCode {
    Trust = 0,
    Deny = -2,
    DeferToPlatform = -3,
}

impl CompletionCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Certificate trust verifier.
#[derive(Clone, Debug)]
pub struct CertificateTrustVerifier {
    /// Hostname of the application's internal backend.
    internal_host: String,
    pins: PinningTable,
}

impl CertificateTrustVerifier {
    /// Create a verifier exempting `internal_host` from chain and pin checks.
    pub fn new(internal_host: &str, pins: PinningTable) -> Self {
        Self {
            internal_host: internal_host.to_ascii_lowercase(),
            pins,
        }
    }

    pub fn pins(&self) -> &PinningTable {
        &self.pins
    }

    pub fn internal_host(&self) -> &str {
        &self.internal_host
    }

    /// Decide whether to trust a handshake.
    ///
    /// Chain failures are checked before pins, so a matching pin never
    /// rescues a broken chain. The internal host skips both checks.
    pub fn verify(&self, request: &VerificationRequest) -> TrustDecision {
        let hostname = request.hostname.to_ascii_lowercase();

        if hostname == self.internal_host {
            return match &request.verification {
                PlatformVerification::Ok => TrustDecision::AcceptWithPlatformDefault,
                PlatformVerification::Failed(status) => {
                    tracing::debug!(hostname = %hostname, status = %status, "Accepting relaxed certificate for internal host");
                    TrustDecision::Accept
                }
            };
        }

        if let PlatformVerification::Failed(status) = &request.verification {
            return TrustDecision::Reject(RejectReason::CertificateChainFailure {
                hostname,
                status: status.clone(),
            });
        }

        match self.pins.entry(&hostname) {
            Some(entry) if entry.matches(&request.certificate) => TrustDecision::Accept,
            Some(entry) => TrustDecision::Reject(RejectReason::PinMismatch {
                message: entry.failure_message.clone(),
                hostname,
            }),
            None => TrustDecision::AcceptWithPlatformDefault,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pinning::{Fingerprint, PinEntry};

    const INTERNAL: &str = "wire-webapp-staging.wire.com";

    fn verifier() -> CertificateTrustVerifier {
        let pins = PinningTable::new([PinEntry::new(
            "app.wire.com",
            [Fingerprint::of_public_key(b"wire-key")],
            "Public key of app.wire.com does not match",
        )]);
        CertificateTrustVerifier::new(INTERNAL, pins)
    }

    fn request(hostname: &str, key: &[u8], status: &str) -> VerificationRequest {
        VerificationRequest::new(
            hostname,
            PeerCertificate::new(key.to_vec()),
            PlatformVerification::from_net_status(status),
        )
    }

    #[test]
    fn test_net_status_mapping() {
        assert!(PlatformVerification::from_net_status("net::OK").is_ok());
        assert_eq!(
            PlatformVerification::from_net_status("net::ERR_CERT_AUTHORITY_INVALID"),
            PlatformVerification::Failed("net::ERR_CERT_AUTHORITY_INVALID".to_string())
        );
    }

    #[test]
    fn test_pinned_host_with_matching_key_is_accepted() {
        let decision = verifier().verify(&request("app.wire.com", b"wire-key", NET_OK));
        assert_eq!(decision, TrustDecision::Accept);
        assert_eq!(decision.completion_code(), CompletionCode::Trust);
    }

    #[test]
    fn test_pinned_host_with_other_key_is_rejected() {
        let decision = verifier().verify(&request("app.wire.com", b"mitm-key", NET_OK));
        match decision {
            TrustDecision::Reject(RejectReason::PinMismatch { hostname, message }) => {
                assert_eq!(hostname, "app.wire.com");
                assert!(message.contains("does not match"));
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn test_chain_failure_short_circuits_matching_pin() {
        let decision = verifier().verify(&request("app.wire.com", b"wire-key", "net::ERR_CERT_DATE_INVALID"));
        assert!(matches!(
            decision,
            TrustDecision::Reject(RejectReason::CertificateChainFailure { .. })
        ));
        assert_eq!(decision.completion_code().as_i32(), -2);
    }

    #[test]
    fn test_unpinned_host_defers_to_platform() {
        let decision = verifier().verify(&request("example.com", b"any", NET_OK));
        assert_eq!(decision, TrustDecision::AcceptWithPlatformDefault);
        assert_eq!(decision.completion_code().as_i32(), -3);
    }

    #[test]
    fn test_unpinned_host_with_chain_failure_is_rejected() {
        let decision = verifier().verify(&request("example.com", b"any", "net::ERR_CERT_INVALID"));
        assert!(decision.is_reject());
    }

    #[test]
    fn test_internal_host_is_exempt() {
        let v = verifier();
        assert_eq!(
            v.verify(&request(INTERNAL, b"self-signed", "net::ERR_CERT_AUTHORITY_INVALID")),
            TrustDecision::Accept
        );
        assert_eq!(
            v.verify(&request(INTERNAL, b"self-signed", NET_OK)),
            TrustDecision::AcceptWithPlatformDefault
        );
    }

    #[test]
    fn test_internal_exemption_is_exact() {
        let decision = verifier().verify(&request(
            "evil.wire-webapp-staging.wire.com",
            b"self-signed",
            "net::ERR_CERT_AUTHORITY_INVALID",
        ));
        assert!(decision.is_reject());
    }

    #[test]
    fn test_hostname_case_is_ignored() {
        let decision = verifier().verify(&request("APP.Wire.com", b"mitm-key", NET_OK));
        assert!(decision.is_reject());
    }
}
