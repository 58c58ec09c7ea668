// ragchat
// Main entry point for the ragchat binary

use clap::Parser;
use ragchat_engine::cli::{Cli, Command};
use ragchat_engine::config::Config;
use ragchat_engine::handlers::{
    handle_ask, handle_chat, handle_doctor, handle_secret, handle_serve, OutputFormat,
};
use ragchat_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    let version = env!("CARGO_PKG_VERSION");
    let commit = env!("GIT_COMMIT_HASH");
    let timestamp = env!("BUILD_TIMESTAMP");

    tracing::info!("ragchat v{} ({} - {})", version, commit, timestamp);

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command {
        Command::Serve { bind } => {
            tracing::info!("Starting HTTP server...");
            handle_serve(&config, bind).await
        }

        Command::Ask { question, user } => handle_ask(&config, question, user, format).await,

        Command::Chat { user } => handle_chat(&config, user, format).await,

        Command::Doctor => handle_doctor(&config, format).await,

        Command::Secret { action } => handle_secret(action, format).await,
    }
}
