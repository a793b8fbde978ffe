//! Gateway request errors.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while serving an Ollama-shaped request.
///
/// Every variant is converted into an Ollama error object (`{"error": "..."}`)
/// at the HTTP boundary; none of them escape as an unhandled fault.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum GatewayError {
    /// Inbound payload is not valid JSON or lacks a required field.
    /// Raised before any upstream traffic.
    #[error("{message}")]
    MalformedRequest { message: String },

    /// Inbound credentials missing or wrong
    #[error("unauthorized: missing or invalid API key")]
    Unauthorized,

    /// Connection refused, DNS failure, TLS failure, or timeout
    #[error("upstream unreachable: {message}")]
    UpstreamUnreachable { message: String, timed_out: bool },

    /// Upstream answered with a non-success status
    #[error("upstream rejected request (HTTP {status}): {message}")]
    UpstreamRejected { status: u16, message: String },

    /// Upstream answered 2xx but the body could not be interpreted
    #[error("invalid upstream response: {message}")]
    InvalidUpstreamResponse { message: String },

    /// Upstream stream ended without a terminal signal
    #[error("upstream stream interrupted: {message}")]
    StreamInterrupted { message: String },
}

impl GatewayError {
    /// Shorthand for [`GatewayError::MalformedRequest`].
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRequest { message: message.into() }
    }

    /// Check if this is a client error (4xx caused by the caller).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MalformedRequest { .. } | Self::Unauthorized)
    }

    /// Get HTTP status code for this error.
    ///
    /// Upstream failures surface as server errors, with two exceptions that
    /// Ollama clients understand natively: an unknown model (404) and
    /// upstream throttling (429).
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::MalformedRequest { .. } => 400,
            Self::Unauthorized => 401,
            Self::UpstreamUnreachable { timed_out: true, .. } => 504,
            Self::UpstreamUnreachable { timed_out: false, .. } => 502,
            Self::UpstreamRejected { status: 404, .. } => 404,
            Self::UpstreamRejected { status: 429, .. } => 429,
            Self::UpstreamRejected { .. } => 502,
            Self::InvalidUpstreamResponse { .. } | Self::StreamInterrupted { .. } => 502,
        }
    }
}
