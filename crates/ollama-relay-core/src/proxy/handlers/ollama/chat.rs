use axum::{extract::State, response::Response};
use bytes::Bytes;
use ollama_relay_types::protocol::ollama::{ChatRequest, ResponseShape};

use super::{completion::complete, new_trace_id, parse_body};
use crate::proxy::common::OllamaError;
use crate::proxy::mappers::ollama::translate_chat;
use crate::proxy::server::AppState;

/// `POST /api/chat`
pub async fn handle_chat(State(state): State<AppState>, body: Bytes) -> Result<Response, OllamaError> {
    let trace_id = new_trace_id();
    let request: ChatRequest = parse_body(&body)?;
    let model = request.model.clone().unwrap_or_default();

    let snapshot = state.snapshot.current().await;
    let upstream = translate_chat(request, &snapshot.aliases)?;

    complete(&snapshot, upstream, ResponseShape::Chat, model, trace_id).await
}
