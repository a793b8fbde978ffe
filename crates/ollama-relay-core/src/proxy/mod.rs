//! Proxy module - Ollama API front end for an OpenAI-compatible upstream
//!
//! - `handlers`: axum handlers for `/`, `/api/tags`, `/api/show`, `/api/chat`,
//!   `/api/generate`, `/api/embeddings`
//! - `mappers`: request/response/stream translation
//! - `upstream`: reqwest client for the OpenAI-compatible endpoint
//! - `snapshot`: per-request immutable configuration

pub mod common;
pub mod handlers;
pub mod mappers;
pub mod middleware;
pub mod server;
pub mod snapshot;
pub mod upstream;

#[cfg(test)]
pub mod tests;

pub use server::{build_relay_router, AppState, RelayServer};
pub use snapshot::{GatewaySnapshot, SharedSnapshot};
pub use upstream::UpstreamClient;
