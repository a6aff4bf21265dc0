//! Embedded surface hardening.

use std::fmt;

bitflags::bitflags! {
    /// Security-relevant preferences of an embedded surface.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct SurfacePreferences: u32 {
        /// Expose the native bridge to page script.
        const NATIVE_BRIDGE = 1 << 0;
        /// Enforce the same-origin policy inside the surface.
        const WEB_SECURITY = 1 << 1;
        /// Run page script in an isolated context.
        const CONTEXT_ISOLATION = 1 << 2;
        /// Allow http subresources on https pages.
        const INSECURE_CONTENT = 1 << 3;
        /// Run plugins.
        const PLUGINS = 1 << 4;
        /// Let the surface resize itself to its content.
        const AUTOSIZE = 1 << 5;
    }
}

impl SurfacePreferences {
    /// Preferences every hardened surface has.
    pub const REQUIRED: Self = Self::WEB_SECURITY.union(Self::CONTEXT_ISOLATION);
    /// Preferences no hardened surface has.
    pub const FORBIDDEN: Self = Self::NATIVE_BRIDGE
        .union(Self::INSECURE_CONTENT)
        .union(Self::PLUGINS)
        .union(Self::AUTOSIZE);

    /// Check whether these preferences are in their hardened form.
    pub fn is_hardened(&self) -> bool {
        self.contains(Self::REQUIRED) && !self.intersects(Self::FORBIDDEN)
    }
}

impl Default for SurfacePreferences {
    fn default() -> Self {
        Self::WEB_SECURITY
    }
}

/// Forces secure defaults onto embedded surfaces.
#[derive(Clone, Copy, Debug, Default)]
pub struct SurfaceHardener;

impl SurfaceHardener {
    pub fn new() -> Self {
        Self
    }

    /// Apply the secure defaults. Idempotent.
    pub fn harden(&self, preferences: &mut SurfacePreferences) {
        preferences.insert(SurfacePreferences::REQUIRED);
        preferences.remove(SurfacePreferences::FORBIDDEN);
    }

    /// Harden an attach request in place.
    pub fn harden_request(&self, request: &mut SurfaceAttachRequest) {
        self.harden(&mut request.preferences);
        request.hardened = true;
    }
}

/// Request from the platform to attach an embedded surface.
///
/// The platform chooses the initial preferences; after construction they can
/// only be tightened by the [`SurfaceHardener`].
#[derive(Clone, Debug)]
pub struct SurfaceAttachRequest {
    target_url: String,
    preferences: SurfacePreferences,
    hardened: bool,
}

impl SurfaceAttachRequest {
    pub fn new(target_url: impl Into<String>, preferences: SurfacePreferences) -> Self {
        Self {
            target_url: target_url.into(),
            preferences,
            hardened: false,
        }
    }

    pub fn target_url(&self) -> &str {
        &self.target_url
    }

    /// Final preferences the platform must create the surface with.
    pub fn preferences(&self) -> SurfacePreferences {
        self.preferences
    }

    /// Whether the hardener has processed this request.
    pub fn is_hardened(&self) -> bool {
        self.hardened
    }
}

impl fmt::Display for SurfaceAttachRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attach {} ({:?})", self.target_url, self.preferences)
    }
}
