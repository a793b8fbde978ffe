// CORS middleware
use axum::http::Method;
use tower_http::cors::{Any, CorsLayer};

/// Ollama clients include browser extensions and web UIs served from
/// arbitrary origins, so any origin is accepted. Credentials are never
/// allowed cross-origin.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}
