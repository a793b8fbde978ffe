//! Renders [`GatewayError`] as an Ollama error object.
//!
//! Ollama clients expect `{"error": "<message>"}` with a meaningful status;
//! raw upstream bodies are never proxied through.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ollama_relay_types::protocol::ollama::ErrorBody;
use ollama_relay_types::GatewayError;

/// Axum adapter for [`GatewayError`]. Handlers return
/// `Result<Response, OllamaError>` and use `?` on `GatewayError`s.
#[derive(Debug)]
pub struct OllamaError(pub GatewayError);

impl From<GatewayError> for OllamaError {
    fn from(err: GatewayError) -> Self {
        Self(err)
    }
}

impl OllamaError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code()).unwrap_or(StatusCode::BAD_GATEWAY)
    }

    pub fn body(&self) -> ErrorBody {
        let error = match &self.0 {
            GatewayError::UpstreamRejected { message, .. } if !message.is_empty() => {
                message.clone()
            },
            other => other.to_string(),
        };
        ErrorBody { error }
    }
}

impl IntoResponse for OllamaError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            tracing::warn!("Rejecting request ({}): {}", status.as_u16(), self.0);
        } else {
            tracing::error!("Upstream failure mapped to {}: {}", status.as_u16(), self.0);
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_keeps_upstream_message() {
        let err = OllamaError(GatewayError::UpstreamRejected {
            status: 401,
            message: "Incorrect API key provided".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.body().error, "Incorrect API key provided");
    }

    #[test]
    fn test_rejected_without_message_uses_display() {
        let err =
            OllamaError(GatewayError::UpstreamRejected { status: 500, message: String::new() });
        assert!(err.body().error.contains("HTTP 500"));
    }

    #[test]
    fn test_malformed_is_bad_request() {
        let err = OllamaError(GatewayError::malformed("model is required"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().error, "model is required");
    }
}
