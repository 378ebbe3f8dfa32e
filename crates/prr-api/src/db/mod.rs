//! # Database Persistence Layer
//!
//! PostgreSQL-backed implementations of the merge workflow's transaction
//! manager and repositories, built on SQLx.
//!
//! ## Design
//!
//! - A merge runs inside one `sqlx::Transaction`. Dropping it without a
//!   commit rolls back, so cancellation and early returns never leave
//!   partial writes behind.
//! - The pull request row is read with `FOR UPDATE`, which serializes
//!   concurrent merges of the same pull request.
//! - `merged_at` is stamped by the database (`NOW()`), not by this process.
//! - Migrations are embedded at compile time and applied on startup.
//!
//! ## Configuration
//!
//! Set `DATABASE_URL` to enable persistence. When absent, the server runs
//! against the in-memory store and nothing survives a restart.

pub mod pull_requests;
pub mod reviewers;
pub mod statuses;
pub mod transaction;

use std::time::Duration;

use prr_core::SystemClock;
use prr_merge::{CreateWorkflow, MergeWorkflow};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;

pub use pull_requests::PgPullRequestRepository;
pub use reviewers::PgReviewerRepository;
pub use statuses::PgStatusRepository;
pub use transaction::{PgScope, PgTransactionManager};

/// Merge workflow wired to PostgreSQL.
pub type PgMergeWorkflow = MergeWorkflow<
    PgTransactionManager,
    PgPullRequestRepository,
    PgStatusRepository,
    PgReviewerRepository,
>;

/// Creation workflow wired to PostgreSQL.
pub type PgCreateWorkflow = CreateWorkflow<
    PgTransactionManager,
    PgPullRequestRepository,
    PgStatusRepository,
    PgReviewerRepository,
>;

/// Initialize the database connection pool and run migrations.
///
/// Returns `Ok(None)` if no database URL is configured.
pub async fn init_pool(config: &DatabaseConfig) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = config.url.as_deref() else {
        tracing::warn!(
            "DATABASE_URL not set, running against the in-memory store. \
             State will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connected to PostgreSQL"
    );

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Build the merge workflow over a connection pool.
pub fn merge_workflow(pool: PgPool) -> PgMergeWorkflow {
    MergeWorkflow::new(
        PgTransactionManager::new(pool),
        PgPullRequestRepository,
        PgStatusRepository,
        PgReviewerRepository,
    )
}

/// Build the creation workflow over a connection pool. `created_at` comes
/// from the system clock.
pub fn create_workflow(pool: PgPool) -> PgCreateWorkflow {
    CreateWorkflow::new(
        PgTransactionManager::new(pool),
        PgPullRequestRepository,
        PgStatusRepository,
        PgReviewerRepository,
        SystemClock,
    )
}
