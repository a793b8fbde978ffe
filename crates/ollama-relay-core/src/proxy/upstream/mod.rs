//! Upstream (OpenAI-compatible) access.

pub mod client;

pub use client::UpstreamClient;
