use std::path::PathBuf;

use ollama_relay_core::modules::config::{load_config, validate_config, LoadedConfig};
use ollama_relay_types::ConfigError;

use crate::cli::Cli;

/// Everything needed to (re)load configuration the same way each time:
/// the file location plus command-line overrides.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
}

impl ConfigSource {
    pub fn from_cli(cli: &Cli) -> Self {
        Self { path: cli.config.clone(), host: cli.host.clone(), port: cli.port }
    }

    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut loaded = load_config(self.path.as_deref())?;
        if let Some(host) = &self.host {
            loaded.config.host = host.clone();
        }
        if let Some(port) = self.port {
            loaded.config.port = port;
        }
        validate_config(&loaded.config)?;
        Ok(loaded)
    }
}
