// Symposium Debate Engine
// Main entry point for the symposium binary

use anyhow::Context;
use clap::Parser;
use symposium_engine::cli::{Cli, Command};
use symposium_engine::config::Config;
use symposium_engine::handlers::{
    handle_ask, handle_doctor, handle_memory, handle_tools, OutputFormat,
};
use symposium_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };
    let config = if cli.config.is_some() {
        Config::load_from_path(&config_path)
    } else {
        Config::load_or_create()
    }
    .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    // --log wins over the config level; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.logging.level);
    init_telemetry_with_level(
        log_level,
        config.logging.file.as_deref(),
        config.logging.console,
    );

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("Symposium v{} ({} - {})", version, commit, timestamp);

    // Handle commands
    match cli.command {
        Command::Ask {
            question,
            rounds,
            no_summary,
            stream,
        } => handle_ask(question, rounds, no_summary, stream, &config, format).await,

        Command::Memory { action } => handle_memory(action, &config, format).await,

        Command::Tools => handle_tools(&config, format).await,

        Command::Doctor => handle_doctor(&config, &config_path, format).await,
    }
}
