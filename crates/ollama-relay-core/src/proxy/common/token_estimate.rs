//! Token count approximation for Ollama's `*_eval_count` fields.
//!
//! The upstream usage block is optional and uses the upstream's own
//! tokenizer, so it is not used. Counts are whitespace-separated words: a
//! stable, documented approximation, never exact usage data.

use ollama_relay_types::protocol::openai::OpenAIMessage;

/// Number of whitespace-separated words in `text`.
pub fn approximate_token_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Approximate prompt size over every outgoing message.
pub fn approximate_prompt_tokens(messages: &[OpenAIMessage]) -> u64 {
    messages.iter().map(|m| approximate_token_count(&m.content)).sum()
}
