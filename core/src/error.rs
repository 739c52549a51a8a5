//! Error types for the Pinboard API client.
//!
//! # Design
//! Failures are classified by where they happen: before the request leaves
//! (`InvalidRequest`), on the wire (`Transport`, `HttpError`), or while mapping
//! the body back into the domain model (`DeserializationError` for the shape,
//! `Format` for a single field). Nothing is recovered locally; every variant
//! reaches the caller unchanged.

use thiserror::Error;

/// Errors returned by `PinboardClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter was missing or malformed. No request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport could not complete the round-trip (connection refused,
    /// timeout, unreadable body).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body does not have the shape expected for the operation.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// A single field does not match its wire format (timestamps, yes/no flags,
    /// counts).
    #[error("malformed {field}: {value:?}")]
    Format { field: &'static str, value: String },
}

impl ApiError {
    /// True for failures that happened on the wire rather than in the core.
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::HttpError { .. })
    }

    pub(crate) fn format(field: &'static str, value: impl Into<String>) -> Self {
        ApiError::Format {
            field,
            value: value.into(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::DeserializationError(err.to_string())
    }
}
