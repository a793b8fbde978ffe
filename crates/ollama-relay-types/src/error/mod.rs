//! Typed error definitions for Ollama Relay.
//!
//! This module provides a structured error hierarchy with specific error types
//! for different domains. All errors are designed to be:
//!
//! - **Serializable** for logs and diagnostics via serde
//! - **Displayable** for client-facing messages via Display trait
//! - **Matchable** for status mapping via enum variants

mod config;
mod gateway;

pub use config::ConfigError;
pub use gateway::GatewayError;

/// Standard Result type for request handling.
pub type Result<T> = std::result::Result<T, GatewayError>;
