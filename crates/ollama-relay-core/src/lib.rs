//! # Ollama Relay Core
//!
//! Translation engine that lets Ollama clients talk to any OpenAI-compatible
//! chat-completions endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ollama-relay-core/src/
//! ├── modules/
//! │   └── config.rs       # config.json discovery, env overrides, validation
//! └── proxy/
//!     ├── snapshot.rs     # immutable per-request config snapshot + atomic swap
//!     ├── common/         # alias table, token approximation, timing, error body
//!     ├── mappers/ollama/ # request/response/stream translation
//!     ├── upstream/       # reqwest client for {base}/chat/completions
//!     ├── handlers/       # axum handlers for /api/*
//!     ├── middleware/     # inbound API key check
//!     └── server.rs       # router + AppState
//! ```
//!
//! Data flow per request: handler → snapshot → alias lookup → request
//! translator → upstream → (response translator | stream reframer) → client.

#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::indexing_slicing,
        clippy::float_cmp
    )
)]

pub mod modules;
pub mod proxy;

// Re-export commonly used types
pub use ollama_relay_types::{ConfigError, GatewayConfig, GatewayError, UpstreamConfig};
pub use proxy::{build_relay_router, GatewaySnapshot, RelayServer, SharedSnapshot, UpstreamClient};
