//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `PinboardClient::build_*` produces
//! an `HttpRequest`, something executes it, and `PinboardClient::parse_*`
//! consumes the resulting `HttpResponse`. The `Transport` trait is that
//! "something" when the facade drives the round-trip itself; callers that do
//! their own I/O can skip it and use the build/parse pairs directly.
//!
//! Status interpretation stays in the core: a transport returns whatever
//! status the server sent and only fails when no response was obtained.

use std::time::Duration;

use crate::error::ApiError;

/// HTTP method for a request. The remote API models every operation,
/// including mutations, as a GET over query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Full URL: base, operation path and rendered query string.
    pub url: String,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// A 200 response carrying `body`.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

/// Executes a request and returns the raw response.
///
/// Implementations must return non-2xx responses as data and reserve `Err`
/// for failures where no response was received.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        // 4xx/5xx come back as responses so the core can classify them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap a pre-configured agent. The agent should have
    /// `http_status_as_error(false)`, otherwise error statuses surface as
    /// `ApiError::Transport` instead of `ApiError::HttpError`.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut response = match request.method {
            HttpMethod::Get => self.agent.get(&request.url).call(),
        }
        .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
