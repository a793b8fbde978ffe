//! # Ollama Relay Types
//!
//! Core types, wire schemas, and error definitions for Ollama Relay.
//!
//! This crate provides the foundational type system for the relay:
//!
//! - **`error`** - Typed error hierarchy for gateway requests and configuration
//! - **`models`** - Configuration models (gateway, upstream)
//! - **`protocol`** - Ollama (inbound) and OpenAI (upstream) wire schemas
//!
//! ## Architecture Role
//!
//! `ollama-relay-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!          ollama-relay-types (this crate)
//!                   │
//!                   ▼
//!           ollama-relay-core
//!                   │
//!                   ▼
//!          ollama-relay-server
//! ```
//!
//! Nothing here depends on an HTTP framework, so the schemas can be reused by
//! clients and tests without pulling in axum or reqwest.

pub mod error;
pub mod models;
pub mod protocol;

// Re-export error types for convenience
pub use error::{ConfigError, GatewayError, Result};

// Re-export core model types
pub use models::{GatewayConfig, UpstreamConfig};
