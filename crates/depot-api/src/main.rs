//! # depot — Binary Entry Point
//!
//! Loads one or more configuration files, builds the registry, and serves
//! the gateway on `0.0.0.0:{port}`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use depot_api::state::AppState;

/// Artifact-repository gateway serving Maven-style repositories over HTTP.
#[derive(Parser, Debug)]
#[command(name = "depot", version, about, long_about = None)]
struct Cli {
    /// Configuration files (YAML or JSON), merged in order.
    #[arg(required = true, value_name = "CONFIG")]
    config: Vec<PathBuf>,

    /// Log at debug level, overriding RUST_LOG.
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let loaded = match depot_config::load_files(&cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            return ExitCode::from(2);
        }
    };

    match serve(AppState::new(loaded.registry), loaded.port) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[tokio::main]
async fn serve(state: AppState, port: u16) -> anyhow::Result<()> {
    let app = depot_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("depot listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("depot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
