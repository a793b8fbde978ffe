use anyhow::Result;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use ollama_relay_core::proxy::common::ModelAliasTable;

use crate::cli::ConfigCommands;
use crate::config_source::ConfigSource;

pub fn handle_config_command(source: &ConfigSource, cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show_config(source),
        ConfigCommands::Validate => validate(source),
    }
}

fn show_config(source: &ConfigSource) -> Result<()> {
    let loaded = source.load()?;
    println!("{}", serde_json::to_string_pretty(&loaded.config.redacted())?);
    Ok(())
}

fn validate(source: &ConfigSource) -> Result<()> {
    let loaded = source.load()?;
    let origin = loaded
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());
    println!("{} Configuration valid ({})", "✓".green(), origin);
    println!("  Listen:   {}", loaded.config.socket_addr());
    println!("  Upstream: {}", loaded.config.upstream.base_url);
    println!("  Aliases:  {}", loaded.config.model_mapping.len());
    Ok(())
}

pub fn show_aliases(source: &ConfigSource) -> Result<()> {
    let loaded = source.load()?;
    let aliases = ModelAliasTable::from(&loaded.config.model_mapping);

    if aliases.is_empty() {
        println!("{}", "No model aliases configured; model names pass through unchanged.".yellow());
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Ollama name", "Upstream model"]);
    for (alias, target) in aliases.iter() {
        table.add_row(vec![alias, target]);
    }
    println!("{table}");
    Ok(())
}
