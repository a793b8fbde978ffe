use ollama_relay_types::protocol::ollama::{OllamaResponse, ResponseShape};
use ollama_relay_types::protocol::openai::ChatCompletionResponse;
use ollama_relay_types::GatewayError;

use crate::proxy::common::{approximate_token_count, timestamp_now, RequestClock};

const DEFAULT_DONE_REASON: &str = "stop";

/// Turn a buffered OpenAI completion into the single Ollama `done: true`
/// object.
///
/// Counts are whitespace approximations. `prompt_eval_count` is computed by
/// the caller from the outgoing messages.
pub fn transform_completion_response(
    completion: ChatCompletionResponse,
    shape: ResponseShape,
    model: &str,
    clock: &RequestClock,
    prompt_eval_count: u64,
) -> Result<OllamaResponse, GatewayError> {
    let choice = completion.choices.into_iter().next().ok_or_else(|| {
        GatewayError::InvalidUpstreamResponse { message: "upstream returned no choices".to_string() }
    })?;

    let text = choice.message.content.unwrap_or_default();
    let eval_count = approximate_token_count(&text);
    let done_reason =
        choice.finish_reason.unwrap_or_else(|| DEFAULT_DONE_REASON.to_string());

    Ok(OllamaResponse::finished(
        shape,
        model,
        timestamp_now(),
        text,
        clock.buffered_metrics(prompt_eval_count, eval_count),
        Some(done_reason),
    ))
}
