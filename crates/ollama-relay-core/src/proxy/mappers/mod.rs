//! Protocol mappers.

pub mod ollama;
