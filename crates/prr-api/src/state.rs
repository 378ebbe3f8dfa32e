//! # Application State
//!
//! Shared state passed to route handlers via the `State` extractor.
//! Handlers only see the workflow entry points; which backend sits behind
//! them is decided once at startup.

use std::fmt;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use prr_core::SystemClock;
use prr_merge::memory::MemoryDatabase;
use prr_merge::{CreatePullRequest, MergePullRequest};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The merge workflow.
    pub merge: Arc<dyn MergePullRequest>,
    /// The creation workflow.
    pub create: Arc<dyn CreatePullRequest>,
    /// Pool pinged by the readiness check. `None` for the in-memory store.
    pub pool: Option<PgPool>,
    /// Renders `/metrics`. When `None` the route is not mounted.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wrap any workflow implementations.
    pub fn new(merge: Arc<dyn MergePullRequest>, create: Arc<dyn CreatePullRequest>) -> Self {
        Self {
            merge,
            create,
            pool: None,
            metrics: None,
        }
    }

    /// State backed by an in-memory store. Timestamps come from the system clock.
    pub fn in_memory(db: MemoryDatabase) -> Self {
        Self::new(
            Arc::new(db.merge_workflow(SystemClock)),
            Arc::new(db.create_workflow(SystemClock)),
        )
    }

    /// State backed by PostgreSQL. Readiness pings `pool`.
    pub fn postgres(pool: PgPool) -> Self {
        let mut state = Self::new(
            Arc::new(crate::db::merge_workflow(pool.clone())),
            Arc::new(crate::db::create_workflow(pool.clone())),
        );
        state.pool = Some(pool);
        state
    }

    /// Expose metrics from `handle` at `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("postgres", &self.pool.is_some())
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}
