//! douanes-rp: maréchaussée reporting service
//!
//! Startup: configuration, logging, database (migrations and affiliation
//! backfill run to completion), village seeding, then the listener.

use anyhow::{Context, Result};
use clap::Parser;
use douanes_common::config::{ConfigOverrides, TomlConfig};
use douanes_common::db::{init_database, villages::seed_villages};
use douanes_rp::{build_router, AppState};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "douanes-rp")]
#[command(about = "Maréchaussée report composition and roster service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "DOUANES_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long, env = "DATABASE_PATH")]
    database: Option<PathBuf>,

    /// Listen address (host:port)
    #[arg(short, long, env = "DOUANES_BIND")]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load(
        args.config.as_deref(),
        ConfigOverrides {
            database_path: args.database,
            bind_addr: args.bind,
        },
    )
    .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting douanes-rp v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &args.config {
        Some(path) if path.exists() => info!("Configuration: {}", path.display()),
        Some(path) => warn!("Config file {} not found, using defaults", path.display()),
        None => info!("Configuration: built-in defaults and environment"),
    }

    let options = config.submission_options()?;
    info!("Submission blackout window: {}", options.blackout);

    let pool = init_database(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;
    info!("Database ready: {}", config.database_path.display());

    seed_villages(&pool, &config.villages).await?;

    let state = AppState::new(pool, options);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("douanes-rp listening on http://{}", config.bind_addr);
    info!("Health check: http://{}/health", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
