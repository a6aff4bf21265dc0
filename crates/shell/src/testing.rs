//! Recording fakes for the host and transport seams.

use crate::host::{HostError, ShellHost};
use crate::oauth::OAuthBridge;
use async_trait::async_trait;
use common::{HeaderMap, SurfaceId};
use networking::{ClientError, TokenTransport, TransportResponse};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use url::Url;

#[derive(Default)]
struct HostLog {
    opened: Vec<(SurfaceId, Url)>,
    closed: Vec<SurfaceId>,
    primary: Vec<Url>,
    external: Vec<Url>,
    fail_next_open: bool,
    close_next_open: bool,
    close_during_open: Option<SurfaceId>,
}

/// Host that records every outbound call.
#[derive(Default)]
pub(crate) struct RecordingHost {
    log: Mutex<HostLog>,
    bridge: Mutex<Option<Weak<OAuthBridge>>>,
}

impl RecordingHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Report every close back to the bridge, like a real platform would.
    pub(crate) fn forward_closes_to(&self, bridge: &Arc<OAuthBridge>) {
        *self.bridge.lock() = Some(Arc::downgrade(bridge));
    }

    pub(crate) fn fail_next_open(&self) {
        self.log.lock().fail_next_open = true;
    }

    /// Report the next opened surface as closed before `open` returns.
    pub(crate) fn close_next_open(&self) {
        self.log.lock().close_next_open = true;
    }

    /// Report a close of `surface` while the next surface is being opened.
    pub(crate) fn close_before_next_open(&self, surface: SurfaceId) {
        self.log.lock().close_during_open = Some(surface);
    }

    pub(crate) fn opened(&self) -> Vec<(SurfaceId, Url)> {
        self.log.lock().opened.clone()
    }

    pub(crate) fn closed(&self) -> Vec<SurfaceId> {
        self.log.lock().closed.clone()
    }

    pub(crate) fn primary_navigations(&self) -> Vec<Url> {
        self.log.lock().primary.clone()
    }

    pub(crate) fn external(&self) -> Vec<Url> {
        self.log.lock().external.clone()
    }
}

impl ShellHost for RecordingHost {
    fn open_transient_surface(&self, url: &Url) -> Result<SurfaceId, HostError> {
        let mut log = self.log.lock();
        if std::mem::take(&mut log.fail_next_open) {
            return Err(HostError::SurfaceCreation("window limit reached".to_string()));
        }
        let surface = SurfaceId::next();
        log.opened.push((surface, url.clone()));
        let close_now = std::mem::take(&mut log.close_next_open);
        let other = log.close_during_open.take();
        drop(log);

        if let Some(other) = other {
            self.close_surface(other);
        }
        if close_now {
            self.close_surface(surface);
        }
        Ok(surface)
    }

    fn close_surface(&self, surface: SurfaceId) {
        self.log.lock().closed.push(surface);

        let bridge = self.bridge.lock().as_ref().and_then(Weak::upgrade);
        if let Some(bridge) = bridge {
            bridge.on_surface_closed(surface);
        }
    }

    fn navigate_primary(&self, url: &Url) {
        self.log.lock().primary.push(url.clone());
    }

    fn open_external(&self, url: &Url) {
        self.log.lock().external.push(url.clone());
    }
}

/// Transport returning a canned response and recording each POST.
pub(crate) struct FakeTransport {
    response: Option<TransportResponse>,
    requests: Mutex<Vec<(Url, HeaderMap, String)>>,
}

impl FakeTransport {
    pub(crate) fn respond(response: TransportResponse) -> Self {
        Self {
            response: Some(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ok(body: &str) -> Self {
        Self::respond(TransportResponse::new(200, body))
    }

    pub(crate) fn failing() -> Self {
        Self {
            response: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<(Url, HeaderMap, String)> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl TokenTransport for FakeTransport {
    async fn post_form(
        &self,
        url: &Url,
        headers: &HeaderMap,
        body: String,
    ) -> Result<TransportResponse, ClientError> {
        self.requests.lock().push((url.clone(), headers.clone(), body));
        self.response
            .clone()
            .ok_or_else(|| ClientError::Response("connection reset by peer".to_string()))
    }
}
