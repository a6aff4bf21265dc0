//! Browsing surface identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque handle for a browsing surface owned by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Wrap a platform-assigned identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocate a process-unique identifier.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Kind of browsing surface an event originates from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Top-level window hosting the first-party application.
    Primary,
    /// Sandboxed sub-browsing-context hosting remote content.
    Embedded,
}

impl SurfaceKind {
    pub fn is_embedded(self) -> bool {
        matches!(self, SurfaceKind::Embedded)
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::Primary => f.write_str("primary"),
            SurfaceKind::Embedded => f.write_str("embedded"),
        }
    }
}
