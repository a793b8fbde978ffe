use axum::{extract::State, Json};
use bytes::Bytes;
use ollama_relay_types::protocol::ollama::{EmbeddingInput, EmbeddingRequest, EmbeddingResponse};
use tracing::{error, info};

use super::{new_trace_id, parse_body};
use crate::proxy::common::OllamaError;
use crate::proxy::mappers::ollama::{transform_embedding_request, transform_embedding_response};
use crate::proxy::server::AppState;

/// `POST /api/embeddings`
pub async fn handle_embeddings(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<EmbeddingResponse>, OllamaError> {
    let trace_id = new_trace_id();
    let request: EmbeddingRequest = parse_body(&body)?;
    let batch = matches!(request.prompt, Some(EmbeddingInput::Batch(_)));

    let snapshot = state.snapshot.current().await;
    let upstream = transform_embedding_request(request, &snapshot.aliases)?;
    info!("[{}] Embeddings | {} | batch: {}", trace_id, upstream.model, batch);

    let response = snapshot.upstream.embeddings(&upstream).await.map_err(|e| {
        error!("[{}] Upstream embeddings failed: {}", trace_id, e);
        e
    })?;
    Ok(Json(transform_embedding_response(response, batch)?))
}
