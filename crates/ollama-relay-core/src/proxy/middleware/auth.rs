use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use crate::proxy::common::OllamaError;
use crate::proxy::server::AppState;
use ollama_relay_types::GatewayError;

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Caller credential from `Authorization: Bearer <key>` or `x-api-key`.
/// Other `Authorization` schemes are ignored.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(str::trim)
        .or_else(|| headers.get("x-api-key").and_then(|h| h.to_str().ok()).map(str::trim))
}

/// Inbound key check for the generation routes.
///
/// Reads the key from the current snapshot so a reload takes effect for the
/// next request. With no key configured every request passes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let snapshot = state.snapshot.current().await;
    let Some(expected) = snapshot.inbound_api_key() else {
        return next.run(request).await;
    };

    let authorized =
        presented_key(request.headers()).is_some_and(|k| constant_time_compare(k, expected));
    if authorized {
        return next.run(request).await;
    }

    tracing::warn!("Rejected unauthenticated {} {}", request.method(), request.uri().path());
    OllamaError(GatewayError::Unauthorized).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret", "secret"));
        assert!(!constant_time_compare("secret", "secreT"));
        assert!(!constant_time_compare("secret", "secret2"));
        assert!(!constant_time_compare("", "secret"));
    }

    #[test]
    fn test_presented_key_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_key(&headers), None);

        headers.insert("x-api-key", HeaderValue::from_static("from-header"));
        assert_eq!(presented_key(&headers), Some("from-header"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-bearer"));
        assert_eq!(presented_key(&headers), Some("from-bearer"));
    }

    #[test]
    fn test_non_bearer_authorization_falls_back_to_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(presented_key(&headers), None);

        headers.insert("x-api-key", HeaderValue::from_static("from-header"));
        assert_eq!(presented_key(&headers), Some("from-header"));
    }
}
