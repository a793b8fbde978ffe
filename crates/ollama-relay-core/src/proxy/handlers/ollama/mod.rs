//! Ollama API surface.

mod chat;
mod completion;
mod embeddings;
mod generate;
mod models;

pub use chat::handle_chat;
pub use embeddings::handle_embeddings;
pub use generate::handle_generate;
pub use models::{handle_list_models, handle_root, handle_show};

use bytes::Bytes;
use ollama_relay_types::GatewayError;
use serde::de::DeserializeOwned;

/// Parse a request body ourselves so that a bad payload gets an Ollama-shaped
/// 400 rather than axum's plain-text rejection.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(GatewayError::malformed("missing request body"));
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::malformed(format!("invalid request body: {}", e)))
}

pub(crate) fn new_trace_id() -> String {
    format!("ollama_{}", chrono::Utc::now().timestamp_micros())
}
