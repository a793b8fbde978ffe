use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;

use ollama_relay_types::{ConfigError, GatewayConfig};

const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "ollama-relay";

pub const ENV_UPSTREAM_URL: &str = "OLLAMA_RELAY_UPSTREAM_URL";
pub const ENV_UPSTREAM_KEY: &str = "OLLAMA_RELAY_UPSTREAM_KEY";
pub const ENV_API_KEY: &str = "OLLAMA_RELAY_API_KEY";

/// A validated configuration and the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: GatewayConfig,
    pub source: Option<PathBuf>,
}

/// Where the configuration file lives.
///
/// An explicit path always wins, even if missing. Otherwise `./config.json`,
/// then the per-user config directory. `None` means run on defaults.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE)).filter(|p| p.is_file())
}

/// Read and parse a config file without applying overrides.
pub fn read_config_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound { path: path.display().to_string() });
    }
    let content = fs::read_to_string(path).map_err(|e| ConfigError::from_io_error(&e))?;
    serde_json::from_str(&content).map_err(|e| ConfigError::from_json_error(&e))
}

/// Environment variables override the file for the values most often
/// injected by deployment tooling.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_UPSTREAM_URL).filter(|v| !v.is_empty()) {
        config.upstream.base_url = url;
    }
    if let Some(key) = lookup(ENV_UPSTREAM_KEY) {
        config.upstream.api_key = key;
    }
    if let Some(key) = lookup(ENV_API_KEY) {
        config.api_key = Some(key);
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), ConfigError> {
    config.validate().map_err(|errors| {
        let field = errors
            .errors()
            .keys()
            .next()
            .map(|k| k.to_string())
            .unwrap_or_else(|| "config".to_string());
        ConfigError::validation(field, errors.to_string())
    })?;

    let base = url::Url::parse(&config.upstream.base_url)
        .map_err(|e| ConfigError::validation("upstream.base_url", e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigError::validation(
            "upstream.base_url",
            format!("unsupported scheme '{}'", base.scheme()),
        ));
    }

    if let Some((alias, _)) =
        config.model_mapping.iter().find(|(k, v)| k.trim().is_empty() || v.trim().is_empty())
    {
        return Err(ConfigError::validation(
            "model_mapping",
            format!("empty alias or target in entry '{}'", alias),
        ));
    }
    Ok(())
}

/// Resolve, read, override and validate in one go.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    load_config_with_env(explicit, |name| std::env::var(name).ok())
}

pub fn load_config_with_env<F>(explicit: Option<&Path>, lookup: F) -> Result<LoadedConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let source = resolve_config_path(explicit);
    let mut config = match &source {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path.display());
            read_config_file(path)?
        },
        None => {
            tracing::info!("No configuration file found, using defaults");
            GatewayConfig::default()
        },
    };

    apply_env_overrides(&mut config, lookup);
    validate_config(&config)?;
    Ok(LoadedConfig { config, source })
}
