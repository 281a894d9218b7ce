use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use solsearch::cli::{Cli, Commands};
use solsearch::config::Config;
use solsearch::logging::init_logging;
use solsearch::metrics;

#[tokio::main]
async fn main() -> Result<()> {
    // Determine working root (current directory)
    let root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Load configuration (if available, otherwise use defaults)
    let config = Config::load(&root).unwrap_or_default();

    // Initialize logging with configuration
    // The guard MUST be held until program exit to ensure logs are flushed
    let _logging_guard = init_logging(&config.logging, &root)?;

    tracing::info!("solsearch starting up");
    tracing::debug!("Loaded configuration from: {}", root.display());

    // Register Prometheus metrics
    metrics::register_metrics();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            solsearch::commands::init::run(force).await?;
        }
        Commands::Add { file } => {
            solsearch::commands::add::run(&file).await?;
        }
        Commands::Search { query, limit, mode } => {
            solsearch::commands::search::run(&query, limit, mode.as_deref()).await?;
        }
        Commands::Recent { limit } => {
            solsearch::commands::recent::run(limit).await?;
        }
        Commands::Rate { id, score, comment } => {
            solsearch::commands::rate::run(&id, score, comment.as_deref()).await?;
        }
        Commands::Migrate {
            batch_size,
            max_documents,
        } => {
            solsearch::commands::migrate::run(batch_size, max_documents).await?;
        }
        Commands::Stats { prometheus } => {
            solsearch::commands::stats::run(prometheus).await?;
        }
    }

    Ok(())
}
