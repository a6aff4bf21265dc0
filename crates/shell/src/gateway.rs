//! Event dispatch for the trust gateway.
//!
//! The platform reports surface, navigation, TLS and title events here. Every
//! handler answers synchronously with a decision, except the OAuth request
//! which resolves once the user finishes the flow.

use crate::config::{Environment, GatewayConfig};
use crate::host::ShellHost;
use crate::oauth::{AccessTokenResult, OAuthBridge, OAuthError, OAuthRequest, ProviderEndpoints};
use common::{HeaderMap, ShellResult, SurfaceId, SurfaceKind};
use networking::TokenTransport;
use shell_security::{
    AttachVerdict, CertificateTrustVerifier, CompletionCode, DevCorsOverride, NavigationAttempt,
    NavigationGuard, NavigationVerdict, SurfaceAttachRequest, TrustDecision, TrustedOrigin,
    VerificationRequest,
};
use std::sync::Arc;
use url::Url;

/// Handlers the platform installs on a newly created surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceBindings {
    /// Route attach requests for embedded children to the gateway.
    pub attach_guard: bool,
    /// Route in-place and new-window navigations to the gateway.
    pub navigation_guard: bool,
    /// Route TLS verification of the surface's session to the gateway.
    pub certificate_verifier: bool,
}

/// The trust gateway.
pub struct Gateway {
    guard: NavigationGuard,
    verifier: CertificateTrustVerifier,
    cors_override: Option<DevCorsOverride>,
    oauth: OAuthBridge,
    oauth_request: OAuthRequest,
    certificate_error_page: Url,
    host: Arc<dyn ShellHost>,
}

impl Gateway {
    /// Build the gateway from startup configuration.
    pub fn new(
        config: &GatewayConfig,
        host: Arc<dyn ShellHost>,
        transport: Arc<dyn TokenTransport>,
    ) -> ShellResult<Self> {
        let origin = config.trusted_origin()?;
        let verifier = CertificateTrustVerifier::new(&config.internal_host()?, config.pinning_table());
        let endpoints = ProviderEndpoints::from_config(&config.oauth)?;

        let cors_override = match config.environment {
            Environment::Localhost => Some(DevCorsOverride::localhost()),
            _ => None,
        };

        tracing::info!(
            origin = %origin,
            environment = %config.environment,
            pins = verifier.pins().len(),
            "Trust gateway initialized"
        );

        Ok(Self {
            guard: NavigationGuard::new(origin),
            verifier,
            cors_override,
            oauth: OAuthBridge::new(host.clone(), transport, endpoints),
            oauth_request: OAuthRequest::new(
                config.oauth.scopes.clone(),
                config.oauth.client_id.clone(),
                config.oauth.client_secret.clone(),
            ),
            certificate_error_page: config.certificate_error_url()?,
            host,
        })
    }

    pub fn trusted_origin(&self) -> &TrustedOrigin {
        self.guard.origin()
    }

    pub fn oauth(&self) -> &OAuthBridge {
        &self.oauth
    }

    /// Decide which handlers a new surface gets.
    pub fn surface_created(&self, kind: SurfaceKind) -> SurfaceBindings {
        SurfaceBindings {
            attach_guard: !kind.is_embedded(),
            navigation_guard: true,
            certificate_verifier: kind.is_embedded(),
        }
    }

    /// Harden an embedded surface and decide whether it may load.
    pub fn attach_embedded_surface(&self, request: &mut SurfaceAttachRequest) -> AttachVerdict {
        self.guard.check_attach(request)
    }

    /// Decide a navigation, opening refused links externally.
    pub fn navigation_attempted(&self, attempt: &NavigationAttempt) -> NavigationVerdict {
        let verdict = self.guard.check_navigation(attempt);
        if let NavigationVerdict::OpenExternally(url) = &verdict {
            self.host.open_external(url);
        }
        verdict
    }

    /// Evaluate a handshake, showing the error page on rejection.
    pub fn verify_certificate(&self, request: &VerificationRequest) -> TrustDecision {
        let decision = self.verifier.verify(request);

        if let TrustDecision::Reject(reason) = &decision {
            tracing::error!(hostname = %request.hostname, %reason, "Rejected TLS connection");
            self.host.navigate_primary(&self.certificate_error_page);
        }

        decision
    }

    /// TLS verification callback; `completion` is invoked exactly once.
    pub fn tls_verification<F>(&self, request: &VerificationRequest, completion: F)
    where
        F: FnOnce(CompletionCode),
    {
        let decision = self.verify_certificate(request);
        completion(decision.completion_code());
    }

    /// Rewrite response headers before they reach a surface.
    pub fn headers_received(&self, response_url: &str, headers: &mut HeaderMap) -> bool {
        match &self.cors_override {
            Some(cors) => cors.apply(response_url, headers),
            None => false,
        }
    }

    /// Title change of any surface.
    pub fn title_changed(&self, surface: SurfaceId, title: &str) -> bool {
        self.oauth.on_title_changed(surface, title)
    }

    /// A surface was closed.
    pub fn surface_closed(&self, surface: SurfaceId) -> bool {
        self.oauth.on_surface_closed(surface)
    }

    /// Run the OAuth flow with the configured client.
    pub async fn request_access_token(&self) -> Result<AccessTokenResult, OAuthError> {
        self.oauth.get_access_token(self.oauth_request.clone()).await
    }
}
