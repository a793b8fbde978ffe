use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ollama-relay",
    about = "Ollama-compatible gateway in front of an OpenAI-compatible API",
    version = env!("CARGO_PKG_VERSION"),
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, global = true, env = "OLLAMA_RELAY_CONFIG", help = "Path to config.json")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, env = "OLLAMA_RELAY_HOST", help = "Override the bind host")]
    pub host: Option<String>,

    #[arg(short, long, global = true, env = "OLLAMA_RELAY_PORT", help = "Override the bind port")]
    pub port: Option<u16>,

    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    #[command(about = "Start the gateway (default if no command specified)")]
    Serve,

    #[command(subcommand, about = "Inspect configuration")]
    Config(ConfigCommands),

    #[command(about = "List configured model aliases")]
    Aliases,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    #[command(about = "Print the effective configuration with secrets masked")]
    Show,

    #[command(about = "Load and validate the configuration, then exit")]
    Validate,
}
