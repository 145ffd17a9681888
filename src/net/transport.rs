//! HTTP transport seam between the gateway and the network.
//!
//! DESIGN
//! ======
//! The gateway only ever sees `HttpRequest` in and `HttpResponse` out, so
//! tests can script responses without a socket. `ReqwestTransport` is the
//! production implementation.

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};

use super::error::GatewayError;

/// Outbound request as assembled by the gateway.
#[derive(Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

// Bodies carry credentials; only their size is printed.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("body_len", &self.body.as_ref().map(String::len))
            .finish_non_exhaustive()
    }
}

/// Status and raw body text of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    /// `true` for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Async HTTP exchange. Enables mocking in tests.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send one request and read its full body.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] if the backend cannot be reached or
    /// the body cannot be read. Non-2xx statuses are NOT errors at this layer.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError>;
}

/// Optional per-request and connect timeouts, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: Option<u64>,
    pub connect_secs: Option<u64>,
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build the underlying client with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::HttpClientBuild`] if the TLS backend or client
    /// cannot be initialized.
    pub fn new(timeouts: Timeouts) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = timeouts.connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| GatewayError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, GatewayError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
