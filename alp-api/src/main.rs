//! alp-api - learning platform content service
//!
//! Serves course/asset CRUD, asset translation and text summarization.

use std::path::PathBuf;
use std::sync::Arc;

use alp_common::config::{read_toml_config_or_default, CliOverrides, ServiceConfig};
use alp_common::db::init_database;
use alp_api::services::GeminiClient;
use alp_api::{build_router, AppState};
use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for alp-api
#[derive(Parser, Debug)]
#[command(name = "alp-api")]
#[command(about = "Learning platform content service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "ALP_CONFIG")]
    config: Option<PathBuf>,

    /// Database connection string
    #[arg(long, env = "ALP_DATABASE_URL")]
    database_url: Option<String>,

    /// Bind address
    #[arg(long, env = "ALP_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "ALP_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Read once before tracing init; RUST_LOG wins over [logging] level
    let (toml_config, config_origin) = read_toml_config_or_default(args.config.as_deref());
    let level = toml_config.logging.level.clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("alp_api={0},alp_common={0},tower_http={0}", level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting alp-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    config_origin.log();
    let config = ServiceConfig::resolve(
        CliOverrides {
            database_url: args.database_url,
            host: args.host,
            port: args.port,
        },
        toml_config,
    );

    let pool = init_database(&config.database_url)
        .await
        .context("Failed to initialize database")?;

    let llm = GeminiClient::new(config.llm.clone(), config.api_key.clone())
        .context("Failed to create AI client")?;
    info!(model = %config.llm.model, "AI client ready");

    if config.token_secret.is_none() {
        warn!("No token secret configured: API authentication disabled");
    } else {
        info!("Bearer token authentication enabled");
    }

    let state = AppState::new(pool, Arc::new(llm), config.token_secret.clone());
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("alp-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
