use ollama_relay_types::protocol::ollama::{
    ChatMessage, ChatRequest, ChatRole, GenerateRequest, OllamaOptions,
};
use ollama_relay_types::protocol::openai::{ChatCompletionRequest, OpenAIMessage};
use ollama_relay_types::GatewayError;
use serde_json::{json, Value};

use crate::proxy::common::ModelAliasTable;

/// Resolve and validate the inbound model name.
pub(super) fn required_model<'a>(
    model: Option<&'a str>,
    aliases: &'a ModelAliasTable,
) -> Result<&'a str, GatewayError> {
    let model = model
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| GatewayError::malformed("model is required"))?;
    Ok(aliases.resolve(model))
}

/// Translate `POST /api/chat` into an OpenAI chat-completions request.
///
/// Messages are copied in order, role for role. Recognized options are
/// renamed, everything else Ollama accepts is dropped.
pub fn translate_chat(
    request: ChatRequest,
    aliases: &ModelAliasTable,
) -> Result<ChatCompletionRequest, GatewayError> {
    let stream = request.wants_stream();
    let model = required_model(request.model.as_deref(), aliases)?.to_string();

    let messages = match request.messages {
        Some(messages) if !messages.is_empty() => messages,
        _ => return Err(GatewayError::malformed("messages is required")),
    };

    let mut upstream = ChatCompletionRequest {
        model,
        messages: messages
            .into_iter()
            .map(|m| OpenAIMessage { role: m.role.into(), content: m.content })
            .collect(),
        stream,
        response_format: request.format.as_ref().and_then(map_format),
        ..Default::default()
    };

    if let Some(options) = request.options {
        apply_options(&mut upstream, options);
    }

    tracing::debug!(
        "[Mapper] chat → {} ({} messages, stream={})",
        upstream.model,
        upstream.messages.len(),
        upstream.stream
    );
    Ok(upstream)
}

/// Translate `POST /api/generate` by building the equivalent chat request:
/// an optional system turn followed by the prompt as a user turn.
pub fn translate_generate(
    request: GenerateRequest,
    aliases: &ModelAliasTable,
) -> Result<ChatCompletionRequest, GatewayError> {
    let prompt = request.prompt.ok_or_else(|| GatewayError::malformed("prompt is required"))?;

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system.filter(|s| !s.is_empty()) {
        messages.push(ChatMessage::new(ChatRole::System, system));
    }
    messages.push(ChatMessage::new(ChatRole::User, prompt));

    translate_chat(
        ChatRequest {
            model: request.model,
            messages: Some(messages),
            stream: request.stream,
            format: request.format,
            options: request.options,
        },
        aliases,
    )
}

fn apply_options(upstream: &mut ChatCompletionRequest, options: OllamaOptions) {
    upstream.temperature = options.temperature;
    upstream.top_p = options.top_p;
    upstream.seed = options.seed;
    upstream.stop = options.stop.filter(|s| !s.is_empty());
    upstream.frequency_penalty = options.frequency_penalty;
    upstream.presence_penalty = options.presence_penalty;

    // num_predict <= 0 means "unlimited" in Ollama. num_ctx is only consulted
    // when num_predict is absent altogether.
    let limit = match options.num_predict {
        Some(n) => Some(n),
        None => options.num_ctx,
    };
    upstream.max_tokens = limit.and_then(|n| u64::try_from(n).ok()).filter(|n| *n > 0);
}

fn map_format(format: &Value) -> Option<Value> {
    match format {
        Value::String(s) if s == "json" => Some(json!({"type": "json_object"})),
        Value::Object(_) => Some(json!({
            "type": "json_schema",
            "json_schema": {"name": "response", "schema": format}
        })),
        _ => None,
    }
}
