//! Ollama Relay - Headless Daemon
//!
//! Serves the Ollama HTTP API (`/api/tags`, `/api/chat`, `/api/generate`, ...)
//! and forwards generation to an OpenAI-compatible `chat/completions`
//! endpoint.
//!
//! Access via: http://localhost:11434

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config_source;
mod server_utils;

use cli::{Cli, Commands};
use config_source::ConfigSource;
use ollama_relay_core::{GatewaySnapshot, RelayServer, SharedSnapshot};

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;
    let source = ConfigSource::from_cli(&cli);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(source).await,
        Commands::Config(cmd) => commands::handle_config_command(&source, cmd),
        Commands::Aliases => commands::show_aliases(&source),
    }
}

async fn serve(source: ConfigSource) -> Result<()> {
    let loaded = source.load()?;
    let config = loaded.config;

    let snapshot = GatewaySnapshot::from_config(&config).map_err(anyhow::Error::msg)?;
    let shared = SharedSnapshot::new(snapshot);
    let addr = config.socket_addr();

    info!("🚀 Ollama Relay starting on {}", addr);
    info!("🔀 Upstream: {}", config.upstream.base_url);
    info!("📋 {} model aliases loaded", config.model_mapping.len());
    if config.inbound_api_key().is_some() {
        info!("🔒 Inbound API key required for generation endpoints");
    }

    #[cfg(unix)]
    tokio::spawn(server_utils::reload_on_sighup(shared.clone(), source, addr.clone()));

    RelayServer::new(addr, shared)
        .run(server_utils::shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!(e))
}
