//! Out-of-band OAuth bridge.
//!
//! A flow opens a transient surface on the provider's consent page, waits
//! for the page to report the outcome through its title, then exchanges the
//! authorization code for tokens with a single form POST.
//!
//! ```text
//! Idle -> Opening -> AwaitingUserAction -> Idle
//!                       | title "Success ..."  -> token exchange
//!                       | title "Denied ..."   -> ProviderDenied
//!                       | surface closed       -> UserCancelled
//!                       | timeout (optional)   -> Timeout
//! ```
//!
//! Only one flow may be in progress per bridge.

use crate::config::OAuthConfig;
use crate::host::ShellHost;
use crate::title_signal::{SignalStatus, TitleSignal};
use common::headers::{content_type, names};
use common::{HeaderMap, ShellError, ShellResult, SurfaceId};
use networking::TokenTransport;
use parking_lot::Mutex;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use url::{form_urlencoded, Url};

/// OAuth flow errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Another authorization is already in progress")]
    AuthorizationInProgress,
    #[error("User closed the window")]
    UserCancelled,
    #[error("Authorization denied: {0}")]
    ProviderDenied(String),
    #[error("Authorization timed out")]
    Timeout,
    #[error("Authorization surface unavailable: {0}")]
    SurfaceUnavailable(String),
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailure(String),
}

/// Client credentials and scopes for one flow.
#[derive(Clone)]
pub struct OAuthRequest {
    pub scopes: Vec<String>,
    pub client_id: String,
    pub client_secret: String,
}

impl OAuthRequest {
    pub fn new(scopes: Vec<String>, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            scopes,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for OAuthRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthRequest")
            .field("scopes", &self.scopes)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Token endpoint response.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AccessTokenResult {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AccessTokenResult {
    pub fn expires_in(&self) -> Option<Duration> {
        self.expires_in.map(Duration::from_secs)
    }
}

impl fmt::Debug for AccessTokenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenResult")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Provider endpoints, parsed once from configuration.
#[derive(Clone, Debug)]
pub struct ProviderEndpoints {
    pub authorization: Url,
    pub token: Url,
    pub redirect_uri: String,
    pub timeout: Option<Duration>,
}

impl ProviderEndpoints {
    pub fn from_config(config: &OAuthConfig) -> ShellResult<Self> {
        if config.redirect_uri.is_empty() {
            return Err(ShellError::config("oauth redirect_uri must not be empty"));
        }

        Ok(Self {
            authorization: Url::parse(&config.authorization_endpoint)?,
            token: Url::parse(&config.token_endpoint)?,
            redirect_uri: config.redirect_uri.clone(),
            timeout: config.timeout(),
        })
    }
}

enum FlowOutcome {
    Resolved(String),
    Denied(String),
    Aborted,
}

enum BridgeState {
    Idle,
    /// The slot is claimed while the host creates the surface. Closes
    /// reported before the host returns are kept until the id is known.
    Opening { closed: Vec<SurfaceId> },
    AwaitingUserAction {
        surface: SurfaceId,
        outcome: oneshot::Sender<FlowOutcome>,
    },
}

/// Drives out-of-band authorization flows.
pub struct OAuthBridge {
    host: Arc<dyn ShellHost>,
    transport: Arc<dyn TokenTransport>,
    endpoints: ProviderEndpoints,
    state: Mutex<BridgeState>,
}

impl OAuthBridge {
    pub fn new(host: Arc<dyn ShellHost>, transport: Arc<dyn TokenTransport>, endpoints: ProviderEndpoints) -> Self {
        Self {
            host,
            transport,
            endpoints,
            state: Mutex::new(BridgeState::Idle),
        }
    }

    /// Whether no flow is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(*self.state.lock(), BridgeState::Idle)
    }

    /// Surface of the flow awaiting the user, if any.
    pub fn pending_surface(&self) -> Option<SurfaceId> {
        match &*self.state.lock() {
            BridgeState::AwaitingUserAction { surface, .. } => Some(*surface),
            _ => None,
        }
    }

    /// Consent page URL for a request.
    pub fn authorization_url(&self, request: &OAuthRequest) -> Url {
        let mut url = self.endpoints.authorization.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &request.client_id)
            .append_pair("redirect_uri", &self.endpoints.redirect_uri)
            .append_pair("scope", &request.scopes.join(" "));
        url
    }

    /// Run a complete flow and return the exchanged tokens.
    pub async fn get_access_token(&self, request: OAuthRequest) -> Result<AccessTokenResult, OAuthError> {
        self.begin(request)?.finish().await
    }

    /// Claim the flow slot and open the consent surface.
    ///
    /// Fails with [`OAuthError::AuthorizationInProgress`] unless the bridge is
    /// idle; the in-progress flow is left untouched.
    pub fn begin(&self, request: OAuthRequest) -> Result<PendingAuthorization<'_>, OAuthError> {
        {
            let mut state = self.state.lock();
            if !matches!(*state, BridgeState::Idle) {
                tracing::warn!("Rejecting authorization request while another is in progress");
                return Err(OAuthError::AuthorizationInProgress);
            }
            *state = BridgeState::Opening { closed: Vec::new() };
        }

        let url = self.authorization_url(&request);

        // The host may emit surface events synchronously; the lock is not held here.
        let surface = match self.host.open_transient_surface(&url) {
            Ok(surface) => surface,
            Err(err) => {
                *self.state.lock() = BridgeState::Idle;
                tracing::error!(error = %err, "Failed to open authorization surface");
                return Err(OAuthError::SurfaceUnavailable(err.to_string()));
            }
        };

        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock();
            let closed_early = matches!(&*state, BridgeState::Opening { closed } if closed.contains(&surface));
            if closed_early {
                tracing::info!(%surface, "User closed the authorization surface");
                *state = BridgeState::Idle;
                let _ = tx.send(FlowOutcome::Aborted);
            } else {
                tracing::debug!(%surface, "Awaiting user action");
                *state = BridgeState::AwaitingUserAction { surface, outcome: tx };
            }
        }

        Ok(PendingAuthorization {
            bridge: self,
            surface,
            request,
            outcome: rx,
        })
    }

    /// Feed a title change of `surface`. Returns whether it settled the flow.
    pub fn on_title_changed(&self, surface: SurfaceId, title: &str) -> bool {
        let Some(signal) = TitleSignal::parse(title) else {
            return false;
        };

        // Release the slot before closing so the close event is not taken as a cancel.
        let Some(tx) = self.take_pending(surface) else {
            return false;
        };
        self.host.close_surface(surface);

        let outcome = match signal.status {
            SignalStatus::Success => {
                tracing::debug!(%surface, "Authorization granted");
                FlowOutcome::Resolved(signal.payload)
            }
            SignalStatus::Denied => {
                tracing::info!(%surface, reason = %signal.payload, "Authorization denied");
                FlowOutcome::Denied(signal.payload)
            }
        };
        let _ = tx.send(outcome);
        true
    }

    /// Feed a surface close. Returns whether it cancelled the flow.
    ///
    /// A close arriving while the consent surface is still being opened is
    /// held until `begin` learns the surface id, and reports `false`.
    pub fn on_surface_closed(&self, surface: SurfaceId) -> bool {
        if let BridgeState::Opening { closed } = &mut *self.state.lock() {
            closed.push(surface);
            return false;
        }

        match self.take_pending(surface) {
            Some(tx) => {
                tracing::info!(%surface, "User closed the authorization surface");
                let _ = tx.send(FlowOutcome::Aborted);
                true
            }
            None => false,
        }
    }

    fn take_pending(&self, surface: SurfaceId) -> Option<oneshot::Sender<FlowOutcome>> {
        let mut state = self.state.lock();
        match &*state {
            BridgeState::AwaitingUserAction { surface: pending, .. } if *pending == surface => {}
            _ => return None,
        }

        match std::mem::replace(&mut *state, BridgeState::Idle) {
            BridgeState::AwaitingUserAction { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    fn token_request_body(&self, request: &OAuthRequest, code: &str) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &request.client_id)
            .append_pair("client_secret", &request.client_secret)
            .append_pair("code", code)
            .append_pair("grant_type", "authorization_code")
            .append_pair("redirect_uri", &self.endpoints.redirect_uri)
            .finish()
    }

    async fn exchange_code(&self, request: &OAuthRequest, code: &str) -> Result<AccessTokenResult, OAuthError> {
        let headers: HeaderMap = [
            (names::ACCEPT, content_type::JSON),
            (names::CONTENT_TYPE, content_type::FORM),
        ]
        .into_iter()
        .collect();
        let body = self.token_request_body(request, code);

        let response = self
            .transport
            .post_form(&self.endpoints.token, &headers, body)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Token exchange request failed");
                OAuthError::TokenExchangeFailure(e.to_string())
            })?;

        if !response.is_success() {
            tracing::error!(status = response.status, "Token endpoint rejected the exchange");
            return Err(OAuthError::TokenExchangeFailure(format!(
                "token endpoint returned status {}",
                response.status
            )));
        }

        if let Some(received) = response.headers.content_type() {
            if !content_type::is_json(received) {
                tracing::error!(content_type = received, "Token endpoint did not answer with JSON");
                return Err(OAuthError::TokenExchangeFailure(format!(
                    "unexpected content type {}",
                    received
                )));
            }
        }

        serde_json::from_str(&response.body).map_err(|e| {
            tracing::error!(error = %e, "Malformed token response");
            OAuthError::TokenExchangeFailure(e.to_string())
        })
    }
}

/// A flow that is waiting for the user.
///
/// Dropping it does not close the surface; the flow still ends on the next
/// title signal or surface close.
pub struct PendingAuthorization<'a> {
    bridge: &'a OAuthBridge,
    surface: SurfaceId,
    request: OAuthRequest,
    outcome: oneshot::Receiver<FlowOutcome>,
}

impl PendingAuthorization<'_> {
    /// The transient consent surface.
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Wait for the user and exchange the authorization code.
    pub async fn finish(mut self) -> Result<AccessTokenResult, OAuthError> {
        let outcome = match self.bridge.endpoints.timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut self.outcome).await {
                Ok(outcome) => outcome.ok(),
                Err(_) => match self.bridge.take_pending(self.surface) {
                    Some(_) => {
                        tracing::warn!(surface = %self.surface, "Authorization timed out");
                        self.bridge.host.close_surface(self.surface);
                        return Err(OAuthError::Timeout);
                    }
                    // Settled concurrently with the deadline.
                    None => self.outcome.try_recv().ok(),
                },
            },
            None => (&mut self.outcome).await.ok(),
        };

        match outcome {
            Some(FlowOutcome::Resolved(code)) => self.bridge.exchange_code(&self.request, &code).await,
            Some(FlowOutcome::Denied(reason)) => Err(OAuthError::ProviderDenied(reason)),
            Some(FlowOutcome::Aborted) | None => Err(OAuthError::UserCancelled),
        }
    }
}
