//! # prr-api: Pull Request Merge Service
//!
//! HTTP transport over the `prr-merge` workflows, with a PostgreSQL backend
//! and an in-memory fallback.
//!
//! ## API Surface
//!
//! | Route                            | Module                      | Purpose                |
//! |----------------------------------|-----------------------------|------------------------|
//! | `POST /api/v1/pullRequest/create` | [`routes::pull_requests`]  | Create a pull request  |
//! | `POST /api/v1/pullRequest/merge` | [`routes::pull_requests`]   | Merge a pull request   |
//! | `GET /openapi.json`              | [`openapi`]                 | OpenAPI document       |
//! | `GET /metrics`                   | [`middleware::metrics`]     | Prometheus scrape      |
//! | `GET /health/liveness`           | this module                 | Liveness check         |
//! | `GET /health/readiness`          | this module                 | Readiness check        |
//!
//! ## Status Mapping
//!
//! | Outcome                  | HTTP | Code             |
//! |--------------------------|------|------------------|
//! | created                  | 201  |                  |
//! | merged / already merged  | 200  |                  |
//! | malformed body           | 400  | `BAD_REQUEST`    |
//! | pull request exists      | 400  | `PR_EXISTS`      |
//! | pull request not found   | 404  | `NOT_FOUND`      |
//! | failed validation        | 422  | `BAD_REQUEST`    |
//! | store failure or panic   | 500  | `INTERNAL_ERROR` |

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;

use crate::state::AppState;

const READINESS_TIMEOUT: Duration = Duration::from_secs(5);

/// Assemble the application router with all routes and middleware.
///
/// Health checks and `/metrics` are mounted outside the trace and metrics
/// layers so scrape and health traffic does not flood the request log.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let api = Router::new()
        .nest("/api/v1", routes::pull_requests::router())
        .merge(openapi::router())
        .layer(middleware::panic::layer())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness))
        .with_state(state);

    let mut app = Router::new().merge(health).merge(api);
    if let Some(handle) = metrics {
        app = app.merge(middleware::metrics::router(handle));
    }
    app
}

/// Liveness: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness: 200 once the store answers. With PostgreSQL the pool
/// must complete `SELECT 1` within five seconds.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let Some(pool) = &state.pool else {
        return (StatusCode::OK, "ready");
    };

    match tokio::time::timeout(READINESS_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => (StatusCode::OK, "ready"),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
        Err(_) => {
            tracing::warn!("readiness check timed out");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}
