//! Protocol definitions for both sides of the relay.
//!
//! - Ollama (`/api/chat`, `/api/generate`, `/api/tags`, ...) is what clients speak
//! - OpenAI (`/chat/completions`, `/embeddings`) is what the upstream speaks

pub mod ollama;
pub mod openai;

// Re-export common protocol enums
pub use ollama::{ChatRole, ResponseShape};
pub use openai::OpenAIRole;
