//! Ollama ⇄ OpenAI translation.
//!
//! - [`request`]: Ollama chat/generate payloads → OpenAI chat-completions
//! - [`response`]: buffered OpenAI completion → single Ollama object
//! - [`streaming`]: OpenAI SSE → Ollama NDJSON
//! - [`embeddings`]: `/api/embeddings` ⇄ `/v1/embeddings`

pub mod embeddings;
pub mod request;
pub mod response;
pub mod streaming;

pub use embeddings::{transform_embedding_request, transform_embedding_response};
pub use request::{translate_chat, translate_generate};
pub use response::transform_completion_response;
pub use streaming::{create_ollama_ndjson_stream, StreamReframer};
