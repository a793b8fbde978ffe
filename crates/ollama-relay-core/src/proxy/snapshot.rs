//! Immutable configuration snapshot shared by in-flight requests.
//!
//! Readers clone the inner `Arc` once per request and never see a partially
//! applied reload; [`SharedSnapshot::replace`] swaps the whole reference.

use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::common::client_builder::build_http_client;
use super::common::{timestamp_now, ModelAliasTable};
use super::upstream::UpstreamClient;
use ollama_relay_types::GatewayConfig;

/// Everything a request needs from configuration, frozen at load time.
#[derive(Clone)]
pub struct GatewaySnapshot {
    pub aliases: ModelAliasTable,
    pub upstream: UpstreamClient,
    inbound_api_key: Option<String>,
    /// Reported as `modified_at` for every listed model
    pub loaded_at: String,
}

impl fmt::Debug for GatewaySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewaySnapshot")
            .field("aliases", &self.aliases.len())
            .field("upstream", &self.upstream)
            .field("inbound_auth", &self.inbound_api_key.is_some())
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl GatewaySnapshot {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, String> {
        let http_client = build_http_client(&config.upstream)?;
        Ok(Self {
            aliases: ModelAliasTable::from(&config.model_mapping),
            upstream: UpstreamClient::new(
                http_client,
                config.upstream.base_url.clone(),
                config.upstream.api_key.clone(),
            )
            .with_request_timeout(config.upstream.request_timeout()),
            inbound_api_key: config.inbound_api_key().map(str::to_string),
            loaded_at: timestamp_now(),
        })
    }

    /// Inbound key callers must present, if auth is enabled.
    pub fn inbound_api_key(&self) -> Option<&str> {
        self.inbound_api_key.as_deref()
    }
}

/// Handle to the current snapshot. Cheap to clone.
#[derive(Clone)]
pub struct SharedSnapshot {
    inner: Arc<RwLock<Arc<GatewaySnapshot>>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: GatewaySnapshot) -> Self {
        Self { inner: Arc::new(RwLock::new(Arc::new(snapshot))) }
    }

    pub async fn current(&self) -> Arc<GatewaySnapshot> {
        Arc::clone(&*self.inner.read().await)
    }

    /// Swap in a new snapshot. Requests already holding the old one finish
    /// against it.
    pub async fn replace(&self, snapshot: GatewaySnapshot) {
        let mut guard = self.inner.write().await;
        *guard = Arc::new(snapshot);
        tracing::info!("[Config] Snapshot replaced ({} aliases)", guard.aliases.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(alias: &str, target: &str) -> GatewayConfig {
        GatewayConfig {
            model_mapping: HashMap::from([(alias.to_string(), target.to_string())]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_in_flight_reader_keeps_old_snapshot() {
        let shared =
            SharedSnapshot::new(GatewaySnapshot::from_config(&config_with("llama2", "gpt-4")).unwrap());
        let held = shared.current().await;

        shared
            .replace(GatewaySnapshot::from_config(&config_with("llama2", "gpt-4o")).unwrap())
            .await;

        assert_eq!(held.aliases.resolve("llama2"), "gpt-4");
        assert_eq!(shared.current().await.aliases.resolve("llama2"), "gpt-4o");
    }

    #[test]
    fn test_debug_hides_inbound_key() {
        let config = GatewayConfig { api_key: Some("inbound-secret".to_string()), ..Default::default() };
        let snapshot = GatewaySnapshot::from_config(&config).unwrap();
        assert_eq!(snapshot.inbound_api_key(), Some("inbound-secret"));
        assert!(!format!("{:?}", snapshot).contains("inbound-secret"));
    }
}
