use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;

use app::App;
use cli::Cli;
use common::config::ClientConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::from_env()?,
    };
    info!(
        "Using credential storage at {}",
        config.storage_path.display()
    );

    let app = App::new(&config)?;

    if let Err(e) = commands::run(&app, cli.command).await {
        error!("Command failed: {}", e);
        return Err(e);
    }

    Ok(())
}
