use ollama_relay_types::protocol::openai::OpenAIErrorEnvelope;
use ollama_relay_types::GatewayError;
use reqwest::{header, Client, Response};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

const MAX_ERROR_TEXT: usize = 512;

pub fn build_url(base_url: &str, endpoint: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), endpoint.trim_start_matches('/'))
}

pub(super) fn build_headers(api_key: &str) -> Result<header::HeaderMap, GatewayError> {
    let mut headers = header::HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
    if !api_key.is_empty() {
        let value = header::HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|_| {
            GatewayError::UpstreamUnreachable {
                message: "configured upstream API key is not a valid header value".to_string(),
                timed_out: false,
            }
        })?;
        headers.insert(header::AUTHORIZATION, value);
    }
    Ok(headers)
}

fn map_transport_error(e: &reqwest::Error) -> GatewayError {
    GatewayError::UpstreamUnreachable { message: e.to_string(), timed_out: e.is_timeout() }
}

/// Pull a human-readable message out of an upstream error body.
///
/// Understands `{"error": {"message": ...}}`, `{"error": "..."}` and
/// `{"message": "..."}`; otherwise falls back to the (truncated) raw text.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(envelope) = serde_json::from_str::<OpenAIErrorEnvelope>(body) {
        return envelope.error.message;
    }
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| value.get("message").and_then(Value::as_str));
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_TEXT) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// POST `body` as JSON to `{base_url}/{endpoint}`.
///
/// A non-2xx status becomes [`GatewayError::UpstreamRejected`]; transport
/// failures become [`GatewayError::UpstreamUnreachable`]. No retries.
/// `total_timeout` covers the request up to the end of the body.
pub(super) async fn post_json<T: Serialize + ?Sized>(
    http_client: &Client,
    base_url: &str,
    api_key: &str,
    endpoint: &str,
    body: &T,
    total_timeout: Option<Duration>,
) -> Result<Response, GatewayError> {
    let url = build_url(base_url, endpoint);
    let headers = build_headers(api_key)?;

    let mut request = http_client.post(&url).headers(headers).json(body);
    if let Some(timeout) = total_timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| map_transport_error(&e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    tracing::warn!("[Upstream] {} returned HTTP {}", url, status.as_u16());
    Err(GatewayError::UpstreamRejected {
        status: status.as_u16(),
        message: extract_error_message(&text),
    })
}
