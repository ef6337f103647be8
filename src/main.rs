use anyhow::{Context, Result};
use clap::Parser;
use linkedin_profile::cli::{handle_command, ProfileCli};
use linkedin_profile::core::ConfigManager;
use linkedin_profile::environment::EnvironmentConfig;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = ProfileCli::parse();

    let config = ConfigManager::load(&cli.config)?;
    config.ensure_directories().await?;

    // Initialize logging once the log path is known
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open(&config.environment.log_path)
        .with_context(|| {
            format!("Failed to open log file: {}", config.environment.log_path.display())
        })?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linkedin_profile=info")),
        )
        .init();

    info!("Environment: {}", EnvironmentConfig::get_environment());
    info!("Database: {}", config.environment.database_path.display());
    match &config.environment.chrome_path {
        Some(path) => info!("Chrome: {}", path.display()),
        None => info!("Chrome: auto-detected"),
    }

    handle_command(cli, config).await
}
