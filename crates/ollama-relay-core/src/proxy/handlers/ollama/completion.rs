use axum::{
    body::Body,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use ollama_relay_types::protocol::ollama::ResponseShape;
use ollama_relay_types::protocol::openai::{ChatCompletionRequest, ChatCompletionResponse};
use tracing::{debug, error, info};

use crate::proxy::common::{approximate_prompt_tokens, OllamaError, RequestClock};
use crate::proxy::mappers::ollama::{
    create_ollama_ndjson_stream, transform_completion_response, StreamReframer,
};
use crate::proxy::upstream::client::{byte_stream, read_json};
use crate::proxy::GatewaySnapshot;

const NDJSON: &str = "application/x-ndjson";

/// Issue the translated request and shape the answer for the client.
///
/// `model` is the name the client asked for; it is echoed back unchanged.
pub(super) async fn complete(
    snapshot: &GatewaySnapshot,
    request: ChatCompletionRequest,
    shape: ResponseShape,
    model: String,
    trace_id: String,
) -> Result<Response, OllamaError> {
    info!(
        "[{}] {:?} | {} → {} | stream: {}",
        trace_id, shape, model, request.model, request.stream
    );
    let prompt_eval_count = approximate_prompt_tokens(&request.messages);

    let mut clock = RequestClock::start();
    let response = snapshot.upstream.chat_completions(&request).await.map_err(|e| {
        error!("[{}] Upstream call failed: {}", trace_id, e);
        e
    })?;
    clock.mark_headers();
    debug!(
        "[{}] {} responded {}",
        trace_id,
        snapshot.upstream.base_url(),
        response.status()
    );

    if request.stream {
        let reframer = StreamReframer::new(shape, model, clock, prompt_eval_count);
        let stream = create_ollama_ndjson_stream(byte_stream(response), reframer, trace_id);
        return Ok(([(header::CONTENT_TYPE, NDJSON)], Body::from_stream(stream)).into_response());
    }

    let completion: ChatCompletionResponse = read_json(response).await.map_err(|e| {
        error!("[{}] Upstream body unreadable: {}", trace_id, e);
        e
    })?;
    let out = transform_completion_response(completion, shape, &model, &clock, prompt_eval_count)?;
    info!("[{}] Completed | eval_count: {:?}", trace_id, out.metrics.map(|m| m.eval_count));
    Ok(Json(out).into_response())
}
