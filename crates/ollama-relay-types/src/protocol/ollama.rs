//! Ollama API types (the inbound surface).
//!
//! Request fields that Ollama treats as optional are `Option`s here; the
//! documented defaults live in accessor methods rather than in ad-hoc probing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message role in an Ollama conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One turn in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Generation options. Ollama accepts a much larger tuning surface; anything
/// not listed here is dropped during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OllamaOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Maximum tokens to generate (`-1`/`-2` mean unlimited in Ollama)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<i64>,
}

/// `POST /api/chat` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Option<Vec<ChatMessage>>,
    /// Defaults to `true` when absent.
    #[serde(default)]
    pub stream: Option<bool>,
    /// `"json"` or a JSON schema object
    #[serde(default)]
    pub format: Option<Value>,
    #[serde(default)]
    pub options: Option<OllamaOptions>,
}

impl ChatRequest {
    pub fn wants_stream(&self) -> bool {
        self.stream.unwrap_or(true)
    }
}

/// `POST /api/generate` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub system: Option<String>,
    /// Defaults to `true` when absent.
    #[serde(default)]
    pub stream: Option<bool>,
    #[serde(default)]
    pub format: Option<Value>,
    #[serde(default)]
    pub options: Option<OllamaOptions>,
}

impl GenerateRequest {
    pub fn wants_stream(&self) -> bool {
        self.stream.unwrap_or(true)
    }
}

/// Which endpoint originated a call, and so which field carries the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `/api/chat`: text goes in `message.content`
    Chat,
    /// `/api/generate`: text goes in `response`
    Generate,
}

/// Synthesized timing/usage block carried by the `done: true` record.
///
/// Durations are nanoseconds. Counts are whitespace-token approximations,
/// not real tokenizer output.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationMetrics {
    pub total_duration: u64,
    pub load_duration: u64,
    pub prompt_eval_count: u64,
    pub prompt_eval_duration: u64,
    pub eval_count: u64,
    pub eval_duration: u64,
}

/// One outbound record: a streamed chunk or the final object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OllamaResponse {
    pub model: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_reason: Option<String>,
    #[serde(flatten)]
    pub metrics: Option<GenerationMetrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OllamaResponse {
    fn with_text(shape: ResponseShape, model: &str, created_at: String, text: String) -> Self {
        let (message, response) = match shape {
            ResponseShape::Chat => (Some(ChatMessage::new(ChatRole::Assistant, text)), None),
            ResponseShape::Generate => (None, Some(text)),
        };
        Self {
            model: model.to_string(),
            created_at,
            message,
            response,
            done: false,
            done_reason: None,
            metrics: None,
            error: None,
        }
    }

    /// Intermediate streamed record carrying one increment of text.
    pub fn delta(shape: ResponseShape, model: &str, created_at: String, text: String) -> Self {
        Self::with_text(shape, model, created_at, text)
    }

    /// The single `done: true` record.
    pub fn finished(
        shape: ResponseShape,
        model: &str,
        created_at: String,
        text: String,
        metrics: GenerationMetrics,
        done_reason: Option<String>,
    ) -> Self {
        let mut record = Self::with_text(shape, model, created_at, text);
        record.done = true;
        record.done_reason = done_reason;
        record.metrics = Some(metrics);
        record
    }

    /// Text carried by this record, whichever field holds it.
    pub fn text(&self) -> &str {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .or(self.response.as_deref())
            .unwrap_or_default()
    }
}

/// Ollama error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// `details` block of a model entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelDetails {
    pub parent_model: String,
    pub format: String,
    pub family: String,
    pub families: Vec<String>,
    pub parameter_size: String,
    pub quantization_level: String,
}

impl Default for ModelDetails {
    fn default() -> Self {
        Self {
            parent_model: String::new(),
            format: "gguf".to_string(),
            family: "openai".to_string(),
            families: vec!["openai".to_string()],
            parameter_size: "N/A".to_string(),
            quantization_level: "N/A".to_string(),
        }
    }
}

/// One entry of `GET /api/tags`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub model: String,
    pub modified_at: String,
    pub size: u64,
    pub digest: String,
    pub details: ModelDetails,
}

/// `GET /api/tags` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagsResponse {
    pub models: Vec<ModelEntry>,
}

/// `POST /api/show` payload. Older clients send `name` instead of `model`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShowRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl ShowRequest {
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().or(self.name.as_deref()).filter(|m| !m.trim().is_empty())
    }
}

/// `POST /api/show` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowResponse {
    pub modelfile: String,
    pub parameters: String,
    pub template: String,
    pub details: ModelDetails,
    pub model_info: serde_json::Map<String, Value>,
    pub capabilities: Vec<String>,
    pub modified_at: String,
}

/// A single prompt or a batch of prompts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EmbeddingInput {
    Single(String),
    Batch(Vec<String>),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddingOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,
}

/// `POST /api/embeddings` payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub prompt: Option<EmbeddingInput>,
    #[serde(default)]
    pub options: Option<EmbeddingOptions>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum EmbeddingOutput {
    Single(Vec<f64>),
    Batch(Vec<Vec<f64>>),
}

/// `POST /api/embeddings` response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingResponse {
    pub embedding: EmbeddingOutput,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stream_defaults_to_true() {
        let req: ChatRequest = serde_json::from_value(json!({
            "model": "llama2",
            "messages": [{"role": "user", "content": "hi"}]
        }))
        .unwrap();
        assert!(req.wants_stream());

        let req: GenerateRequest =
            serde_json::from_value(json!({"model": "llama2", "prompt": "hi", "stream": false}))
                .unwrap();
        assert!(!req.wants_stream());
    }

    #[test]
    fn test_unrecognized_options_are_dropped() {
        let req: ChatRequest = serde_json::from_value(json!({
            "model": "llama2",
            "messages": [],
            "options": {"temperature": 0.2, "mirostat": 2, "num_gpu": 1}
        }))
        .unwrap();
        let options = req.options.unwrap();
        assert_eq!(options.temperature, Some(0.2));
        assert_eq!(options, OllamaOptions { temperature: Some(0.2), ..Default::default() });
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result = serde_json::from_value::<ChatRequest>(json!({
            "model": "llama2",
            "messages": [{"role": "wizard", "content": "hi"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_delta_record_shapes() {
        let chat = OllamaResponse::delta(
            ResponseShape::Chat,
            "llama2",
            "2024-01-01T00:00:00Z".to_string(),
            "hel".to_string(),
        );
        let value = serde_json::to_value(&chat).unwrap();
        assert_eq!(value["message"]["role"], "assistant");
        assert_eq!(value["message"]["content"], "hel");
        assert_eq!(value["done"], false);
        assert!(value.get("response").is_none());
        assert!(value.get("total_duration").is_none());

        let generate = OllamaResponse::delta(
            ResponseShape::Generate,
            "llama2",
            "2024-01-01T00:00:00Z".to_string(),
            "hel".to_string(),
        );
        let value = serde_json::to_value(&generate).unwrap();
        assert_eq!(value["response"], "hel");
        assert!(value.get("message").is_none());
    }

    #[test]
    fn test_finished_record_flattens_metrics() {
        let metrics = GenerationMetrics {
            total_duration: 10,
            load_duration: 1,
            prompt_eval_count: 2,
            prompt_eval_duration: 3,
            eval_count: 4,
            eval_duration: 5,
        };
        let record = OllamaResponse::finished(
            ResponseShape::Chat,
            "llama2",
            "2024-01-01T00:00:00Z".to_string(),
            String::new(),
            metrics,
            Some("stop".to_string()),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["done"], true);
        assert_eq!(value["done_reason"], "stop");
        assert_eq!(value["total_duration"], 10);
        assert_eq!(value["eval_count"], 4);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_embedding_input_accepts_string_or_list() {
        let single: EmbeddingRequest =
            serde_json::from_value(json!({"model": "m", "prompt": "hello"})).unwrap();
        assert_eq!(single.prompt, Some(EmbeddingInput::Single("hello".to_string())));

        let batch: EmbeddingRequest =
            serde_json::from_value(json!({"model": "m", "prompt": ["a", "b"]})).unwrap();
        assert_eq!(
            batch.prompt,
            Some(EmbeddingInput::Batch(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_show_request_accepts_legacy_name() {
        let req: ShowRequest = serde_json::from_value(json!({"name": "llama2"})).unwrap();
        assert_eq!(req.model_name(), Some("llama2"));

        let empty: ShowRequest = serde_json::from_value(json!({"model": "  "})).unwrap();
        assert_eq!(empty.model_name(), None);
    }
}
