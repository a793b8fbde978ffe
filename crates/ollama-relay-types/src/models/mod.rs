//! Configuration models for Ollama Relay.

mod config;

pub use config::{GatewayConfig, UpstreamConfig};
