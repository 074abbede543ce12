//! setwise-assist - Track Assistance Microservice
//!
//! Suggests cue points, next tracks and descriptive tags for a DJ set and
//! stores what the user accepts. Listens on 127.0.0.1, port 5730 by default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use setwise_common::config::{open_log_file, RootFolderInitializer, RootFolderResolver, PORT_ENV};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use setwise_assist::AppState;

const MODULE_NAME: &str = "setwise-assist";

/// Command-line arguments for setwise-assist
#[derive(Parser, Debug)]
#[command(name = "setwise-assist")]
#[command(about = "Track assistance microservice: cue points, set suggestions, tags")]
#[command(version)]
struct Args {
    /// Root folder holding the database
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = PORT_ENV)]
    port: Option<u16>,

    /// Config file (defaults to ~/.config/setwise/setwise-assist.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME)
        .with_cli_root_folder(args.root_folder)
        .with_config_path(args.config);
    let logging = &resolver.load_toml().logging;

    // RUST_LOG wins over the [logging] section
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));
    match &logging.file {
        Some(path) => {
            let file = open_log_file(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    info!(
        "Starting setwise-assist v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    if let Some(problem) = resolver.load_problem() {
        warn!("{}", problem);
    }

    // Step 1: Resolve root folder
    let root_folder = resolver.resolve();
    let port = resolver.resolve_port(args.port);

    // Step 2: Create root folder directory if missing
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .map_err(|e| anyhow::anyhow!("Failed to initialize root folder: {}", e))?;
    info!("Root folder: {}", initializer.root_folder().display());

    // Step 3: Open or create database
    let db_path = initializer.database_path();
    if !initializer.database_exists() {
        info!("Creating new database");
    }
    info!("Database: {}", db_path.display());

    let db_pool = setwise_assist::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let state = AppState::new(db_pool);
    let app = setwise_assist::build_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
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
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
