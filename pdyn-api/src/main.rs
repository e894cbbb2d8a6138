//! pdyn-api - read-only project dynamics service
//!
//! Serves project progress timelines reconstructed from the section
//! snapshot database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pdyn_common::config::{resolve_database_path, TomlConfig, DATABASE_ENV_VAR};
use pdyn_common::{db, TagResolver, TimelineReconstructor};
use pdyn_api::{build_router, AppState};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "pdyn-api", version, about = "Project progress timeline service")]
struct Args {
    /// Snapshot database (falls back to PDYN_DATABASE, config, platform default)
    #[arg(long)]
    database: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "PDYN_BIND")]
    bind: Option<String>,

    /// Config file
    #[arg(long, env = "PDYN_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config is read before tracing init so its log level applies
    let config = TomlConfig::load_or_default(args.config.as_deref());
    let log_level = config
        .as_ref()
        .map(|c| c.log_level().to_string())
        .unwrap_or_else(|_| pdyn_common::config::DEFAULT_LOG_LEVEL.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    info!("Starting pdyn-api v{}", env!("CARGO_PKG_VERSION"));

    let config = config.context("Failed to load configuration")?;

    let catalog = config.tag_catalog().context("Invalid progress tag catalog")?;
    info!(
        "Progress tag catalog v{} ({} tags)",
        catalog.version(),
        catalog.len()
    );

    let offset = config.reporting_offset()?;
    let filter = config.section_filter();
    info!(
        "Reporting timezone UTC{}, reserved section markers {:?}",
        offset,
        filter.markers()
    );

    let db_path = resolve_database_path(args.database.as_deref(), DATABASE_ENV_VAR, &config);
    info!("Database path: {}", db_path.display());

    let pool = match db::connect_readonly(&db_path).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(
        pool,
        TagResolver::new(catalog),
        TimelineReconstructor::new(offset).with_filter(filter),
    )
    .with_average_label(config.average_label());
    let app = build_router(state);

    let bind = args.bind.unwrap_or_else(|| config.bind().to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("pdyn-api listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
