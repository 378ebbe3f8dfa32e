//! # prr-api: Binary Entry Point
//!
//! Parses configuration, initializes logging and metrics, selects the
//! store and serves the API until Ctrl-C or SIGTERM.

use anyhow::Context;
use clap::Parser;
use prr_api::config::{AppConfig, LoggingConfig};
use prr_api::state::AppState;
use prr_merge::memory::MemoryDatabase;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();
    init_tracing(&config.logging);
    tracing::debug!(?config, "configuration loaded");

    let mut state = match prr_api::db::init_pool(&config.database)
        .await
        .context("database initialization failed")?
    {
        Some(pool) => AppState::postgres(pool),
        None => AppState::in_memory(MemoryDatabase::new()),
    };

    if config.metrics_enabled {
        let handle = prr_api::middleware::metrics::install()
            .context("failed to install the Prometheus recorder")?;
        state = state.with_metrics(handle);
        tracing::info!("metrics exposed at /metrics");
    }

    let app = prr_api::app(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("prr-api listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("prr-api stopped");
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
