//! Carebot CLI
//!
//! Main entry point for the carebot command-line tool.
//! Runs queries through the multi-agent chat pipeline, ingests documents
//! into the knowledge base, and reports component status.

mod commands;

use clap::{Parser, Subcommand};
use commands::{ChatCommand, IngestCommand, StatusCommand};
use carebot_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Carebot CLI - multi-agent medical chat pipeline
#[derive(Parser, Debug)]
#[command(name = "carebot")]
#[command(about = "Multi-agent medical chat pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "CAREBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Directory for flat-file session/project storage
    #[arg(short, long, global = true, env = "CAREBOT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one query through the chat pipeline
    Chat(ChatCommand),

    /// Add documents to the knowledge base
    Ingest(IngestCommand),

    /// Show component availability
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.config,
        cli.data_dir,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Carebot CLI starting");
    tracing::debug!("Data dir: {:?}", config.data_dir);

    config.ensure_data_dir()?;

    let command_name = match &cli.command {
        Commands::Chat(_) => "chat",
        Commands::Ingest(_) => "ingest",
        Commands::Status(_) => "status",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Status(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
