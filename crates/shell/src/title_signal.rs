//! Out-of-band result signal carried in a document title.
//!
//! With the out-of-band redirect placeholder the identity provider never
//! redirects anywhere. Instead its final page sets the title to
//! `Success code=<code>` or `Denied error=<reason>`. Any other title is
//! ordinary page-load noise and yields no signal.

use std::fmt;

/// Outcome the provider reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalStatus {
    Success,
    Denied,
}

/// A typed title signal.
#[derive(Clone, PartialEq, Eq)]
pub struct TitleSignal {
    pub status: SignalStatus,
    /// Authorization code on success, reason on denial.
    pub payload: String,
}

impl TitleSignal {
    /// Parse a title, returning `None` for titles that carry no signal.
    ///
    /// The status word is followed by either `key=<payload>` or the bare
    /// payload. An empty payload is not a signal.
    pub fn parse(title: &str) -> Option<Self> {
        let (status, rest) = title.trim().split_once(' ')?;

        let status = match status {
            "Success" => SignalStatus::Success,
            "Denied" => SignalStatus::Denied,
            _ => return None,
        };

        let payload = match rest.split_once('=') {
            Some((_key, value)) => value,
            None => rest,
        }
        .trim();

        if payload.is_empty() {
            return None;
        }

        Some(Self {
            status,
            payload: payload.to_string(),
        })
    }
}

// The payload is an authorization code on success.
impl fmt::Debug for TitleSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let payload = match self.status {
            SignalStatus::Success => "[REDACTED]",
            SignalStatus::Denied => self.payload.as_str(),
        };
        f.debug_struct("TitleSignal")
            .field("status", &self.status)
            .field("payload", &payload)
            .finish()
    }
}
