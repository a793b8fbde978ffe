//! Upstream (OpenAI-compatible endpoint) configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Where translated requests are sent, and how.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct UpstreamConfig {
    /// Base URL; `/chat/completions` and `/embeddings` are appended
    #[validate(url)]
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token sent upstream. Never logged.
    #[serde(default)]
    pub api_key: String,
    /// Seconds a buffered call may take in total, and the longest a stream
    /// may go without delivering a chunk
    #[validate(range(min = 5_u64, max = 3600_u64))]
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Optional outbound HTTP/SOCKS proxy for reaching the upstream
    #[validate(url)]
    #[serde(default)]
    pub proxy_url: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            request_timeout_secs: default_request_timeout(),
            proxy_url: None,
        }
    }
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub const fn default_request_timeout() -> u64 {
    300
}
