//! Common utilities module
//!
//! Shared helpers for handlers and mappers.

pub mod client_builder;
pub mod error_response;
pub mod model_mapping;
pub mod timing;
pub mod token_estimate;

// Re-export key types
pub use error_response::OllamaError;
pub use model_mapping::ModelAliasTable;
pub use timing::{timestamp_now, RequestClock};
pub use token_estimate::{approximate_prompt_tokens, approximate_token_count};
