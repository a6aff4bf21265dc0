//! Certificate pinning table.
//!
//! Pins are SHA-256 digests of a certificate's SubjectPublicKeyInfo, written
//! as `sha256/<base64>`. A pinned host is accepted when any public key in the
//! presented chain matches one of its pins.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

const FINGERPRINT_PREFIX: &str = "sha256/";

/// Pinning configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    #[error("Invalid fingerprint {0:?}: expected sha256/<base64 of 32 bytes>")]
    InvalidFingerprint(String),
}

/// SHA-256 public key fingerprint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a DER-encoded SubjectPublicKeyInfo.
    pub fn of_public_key(public_key_info: &[u8]) -> Self {
        let digest = Sha256::digest(public_key_info);
        Self(format!("{}{}", FINGERPRINT_PREFIX, BASE64.encode(digest)))
    }

    /// Parse a `sha256/<base64>` fingerprint.
    pub fn parse(value: &str) -> Result<Self, PinError> {
        let encoded = value
            .trim()
            .strip_prefix(FINGERPRINT_PREFIX)
            .ok_or_else(|| PinError::InvalidFingerprint(value.to_string()))?;

        match BASE64.decode(encoded) {
            Ok(digest) if digest.len() == 32 => Ok(Self(format!("{}{}", FINGERPRINT_PREFIX, encoded))),
            _ => Err(PinError::InvalidFingerprint(value.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = PinError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Certificate presented by a peer, as handed over by the platform TLS layer.
///
/// Only the public key material is kept; the chain is linked through
/// `issuer`, leaf first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PeerCertificate {
    public_key_info: Vec<u8>,
    issuer: Option<Box<PeerCertificate>>,
}

impl PeerCertificate {
    /// Create a certificate from its DER-encoded SubjectPublicKeyInfo.
    pub fn new(public_key_info: impl Into<Vec<u8>>) -> Self {
        Self {
            public_key_info: public_key_info.into(),
            issuer: None,
        }
    }

    /// Attach the issuing certificate.
    pub fn with_issuer(mut self, issuer: PeerCertificate) -> Self {
        self.issuer = Some(Box::new(issuer));
        self
    }

    pub fn public_key_info(&self) -> &[u8] {
        &self.public_key_info
    }

    pub fn issuer(&self) -> Option<&PeerCertificate> {
        self.issuer.as_deref()
    }

    /// Iterate over the chain, leaf first.
    pub fn chain(&self) -> impl Iterator<Item = &PeerCertificate> {
        std::iter::successors(Some(self), |cert| cert.issuer())
    }

    /// Fingerprints of every public key in the chain, leaf first.
    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        self.chain()
            .map(|cert| Fingerprint::of_public_key(&cert.public_key_info))
            .collect()
    }
}

/// Expected fingerprints for one hostname.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinEntry {
    /// Exact hostname; no wildcard matching.
    pub hostname: String,
    /// Accepted public key fingerprints.
    pub fingerprints: BTreeSet<Fingerprint>,
    /// Message reported when the presented chain matches none of the pins.
    pub failure_message: String,
}

impl PinEntry {
    /// Create a pin entry.
    pub fn new(
        hostname: &str,
        fingerprints: impl IntoIterator<Item = Fingerprint>,
        failure_message: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.to_ascii_lowercase(),
            fingerprints: fingerprints.into_iter().collect(),
            failure_message: failure_message.into(),
        }
    }

    /// Check whether any key in the chain is pinned by this entry.
    pub fn matches(&self, certificate: &PeerCertificate) -> bool {
        certificate
            .fingerprints()
            .iter()
            .any(|fingerprint| self.fingerprints.contains(fingerprint))
    }
}

/// Immutable hostname to pin lookup.
#[derive(Clone, Debug, Default)]
pub struct PinningTable {
    entries: HashMap<String, PinEntry>,
}

impl PinningTable {
    /// Build the table. Entries for the same hostname are merged.
    pub fn new(entries: impl IntoIterator<Item = PinEntry>) -> Self {
        let mut table: HashMap<String, PinEntry> = HashMap::new();

        for mut entry in entries {
            entry.hostname = entry.hostname.to_ascii_lowercase();
            match table.get_mut(&entry.hostname) {
                Some(existing) => existing.fingerprints.extend(entry.fingerprints),
                None => {
                    table.insert(entry.hostname.clone(), entry);
                }
            }
        }

        Self { entries: table }
    }

    /// True iff the hostname has a pin entry (exact match).
    pub fn should_pin(&self, hostname: &str) -> bool {
        self.entry(hostname).is_some()
    }

    /// Look up the pin entry for a hostname.
    pub fn entry(&self, hostname: &str) -> Option<&PinEntry> {
        self.entries.get(&hostname.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
