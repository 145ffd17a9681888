//! Request gateway: issues auth API calls and tracks their loading/error state.
//!
//! DESIGN
//! ======
//! One gateway per UI context, built from an injected [`GatewayConfig`] and
//! transport. Request cycles are serialized through an async mutex so the
//! shared `loading`/`error` flags only ever describe one request. Building the
//! request body happens under the same lock, so a pre-send failure is ordered
//! with the responses around it. State is published on a `watch` channel;
//! `state()` snapshots it and `subscribe()` follows every transition.
//!
//! `loading` counts queued cycles as well as the one on the wire: it drops to
//! `false` only when the last pending cycle resolves.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is recorded as the observable error string AND returned as
//! a typed [`GatewayError`]. The string is lossy on purpose: it is what a
//! warning banner shows. Nothing is retried.

use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use uuid::Uuid;

use super::error::{GatewayError, MalformedReason};
use super::transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use super::types::{AuthOperation, Credentials, RequestState, ResponseEnvelope};
use crate::config::GatewayConfig;

pub struct Gateway<T = ReqwestTransport> {
    config: GatewayConfig,
    transport: T,
    state: watch::Sender<RequestState>,
    inflight: Mutex<()>,
    pending: AtomicUsize,
}

impl Gateway<ReqwestTransport> {
    /// Build a gateway backed by a `reqwest` client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let transport = ReqwestTransport::new(config.timeouts)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: HttpTransport> Gateway<T> {
    #[must_use]
    pub fn new(config: GatewayConfig, transport: T) -> Self {
        let (state, _initial) = watch::channel(RequestState::default());
        Self { config, transport, state, inflight: Mutex::new(()), pending: AtomicUsize::new(0) }
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Snapshot of the current loading/error flags.
    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    /// Receiver notified on every state transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state.subscribe()
    }

    /// Reset the stored error. `loading` is untouched.
    pub fn clear_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    // =========================================================================
    // GENERIC REQUEST
    // =========================================================================

    /// Issue one request and return the parsed JSON body.
    ///
    /// `headers = None` sends the configured defaults (`Content-Type: application/json`).
    ///
    /// # Errors
    ///
    /// - [`GatewayError::Transport`] if the backend cannot be reached
    /// - [`GatewayError::Rejected`] on a non-2xx status with a `details` message
    /// - [`GatewayError::Malformed`] if the body is not JSON, or a rejection has no `details`
    pub async fn request(
        &self,
        url: Url,
        method: Method,
        body: Option<String>,
        headers: Option<HeaderMap>,
    ) -> Result<Value, GatewayError> {
        let headers = headers.unwrap_or_else(|| self.config.default_headers());
        self.cycle(|| Ok(HttpRequest { method, url, headers, body }), |_, value| Ok(value))
            .await
    }

    /// `GET url` with default headers.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::request`].
    pub async fn get(&self, url: Url) -> Result<Value, GatewayError> {
        self.request(url, Method::GET, None, None).await
    }

    // =========================================================================
    // AUTH OPERATIONS
    // =========================================================================

    /// `POST /auth/login`, returning the response's `details` payload.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::authenticate`].
    pub async fn login_user(&self, credentials: &Credentials) -> Result<Value, GatewayError> {
        self.authenticate(AuthOperation::Login, credentials).await
    }

    /// `POST /auth/sign_up`, returning the response's `details` payload.
    ///
    /// # Errors
    ///
    /// Same as [`Gateway::authenticate`].
    pub async fn sign_up_user(&self, credentials: &Credentials) -> Result<Value, GatewayError> {
        self.authenticate(AuthOperation::SignUp, credentials).await
    }

    /// Run the selected auth operation.
    ///
    /// # Errors
    ///
    /// Everything [`Gateway::request`] returns, plus
    /// [`GatewayError::Malformed`] with [`MalformedReason::MissingDetails`]
    /// when a success body has no `details` field.
    pub async fn authenticate(
        &self,
        operation: AuthOperation,
        credentials: &Credentials,
    ) -> Result<Value, GatewayError> {
        let build = || -> Result<HttpRequest, GatewayError> {
            let url = self.config.endpoint(operation.path())?;
            let payload = credentials.payload(self.config.username_policy);
            let body = serde_json::to_string(&payload).map_err(|e| GatewayError::Encode(e.to_string()))?;
            tracing::debug!(operation = operation.label(), email = %credentials.email, "authenticating");
            Ok(HttpRequest { method: Method::POST, url, headers: self.config.default_headers(), body: Some(body) })
        };
        self.cycle(build, take_details).await
    }

    // =========================================================================
    // REQUEST CYCLE
    // =========================================================================

    async fn cycle<B, F>(&self, build: B, extract: F) -> Result<Value, GatewayError>
    where
        B: FnOnce() -> Result<HttpRequest, GatewayError> + Send,
        F: FnOnce(u16, Value) -> Result<Value, GatewayError> + Send,
    {
        let loading = LoadingGuard::start(&self.state, &self.pending);
        let _serial = self.inflight.lock().await;
        let request_id = Uuid::new_v4();

        let result = async {
            let request = build()?;
            tracing::debug!(%request_id, method = %request.method, url = %request.url, "sending request");
            let response = self.transport.send(request).await?;
            tracing::debug!(%request_id, status = response.status, "response received");
            parse_response(&response).and_then(|value| extract(response.status, value))
        }
        .await;

        if let Err(e) = &result {
            tracing::warn!(%request_id, code = e.error_code(), error = %e, "request failed");
        }
        loading.finish(result.as_ref().err().map(ToString::to_string));
        result
    }
}

/// Turn a raw response into JSON, or into the error its status implies.
fn parse_response(response: &HttpResponse) -> Result<Value, GatewayError> {
    let status = response.status;
    let value = serde_json::from_str::<Value>(&response.body).map_err(|e| GatewayError::Malformed {
        status,
        reason: MalformedReason::InvalidJson(e.to_string()),
    })?;
    if response.is_success() {
        return Ok(value);
    }
    let message = envelope(status, value)?
        .message()
        .filter(|m| !m.trim().is_empty())
        .ok_or(GatewayError::Malformed { status, reason: MalformedReason::MissingDetails })?;
    Err(GatewayError::Rejected { status, message })
}

fn take_details(status: u16, value: Value) -> Result<Value, GatewayError> {
    envelope(status, value)?
        .into_payload()
        .ok_or(GatewayError::Malformed { status, reason: MalformedReason::MissingDetails })
}

fn envelope(status: u16, value: Value) -> Result<ResponseEnvelope, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::Malformed {
        status,
        reason: MalformedReason::InvalidEnvelope(e.to_string()),
    })
}

/// Holds `loading = true` for the life of one request cycle, queued or sent.
///
/// Dropping without `finish` (a cancelled future) still releases its slot.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<RequestState>,
    pending: &'a AtomicUsize,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a watch::Sender<RequestState>, pending: &'a AtomicUsize) -> Self {
        state.send_modify(|s| {
            pending.fetch_add(1, Ordering::SeqCst);
            s.loading = true;
        });
        Self { state, pending, armed: true }
    }

    fn finish(mut self, error: Option<String>) {
        self.armed = false;
        let pending = self.pending;
        self.state.send_modify(|s| {
            s.loading = release(pending);
            if let Some(message) = error {
                s.error = Some(message);
            }
        });
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let pending = self.pending;
            self.state.send_modify(|s| s.loading = release(pending));
        }
    }
}

/// Give up one pending slot; `true` while other cycles are still queued.
fn release(pending: &AtomicUsize) -> bool {
    pending.fetch_sub(1, Ordering::SeqCst) > 1
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
