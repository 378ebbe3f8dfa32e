//! Transaction scope for PostgreSQL and the `sqlx::Error` mapping shared by
//! the repositories.

use async_trait::async_trait;
use prr_merge::{StoreError, TransactionManager};
use sqlx::{PgPool, Postgres, Transaction};

/// One open database transaction. Dropping it rolls back.
pub type PgScope = Transaction<'static, Postgres>;

/// Opens and commits [`PgScope`]s from a pool.
#[derive(Debug, Clone)]
pub struct PgTransactionManager {
    pool: PgPool,
}

impl PgTransactionManager {
    /// Wrap a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionManager for PgTransactionManager {
    type Scope = PgScope;

    async fn begin(&self) -> Result<PgScope, StoreError> {
        self.pool.begin().await.map_err(backend_error)
    }

    async fn commit(&self, scope: PgScope) -> Result<(), StoreError> {
        scope.commit().await.map_err(backend_error)
    }
}

/// Map a driver error that is not a missing row.
pub(crate) fn backend_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StoreError::Conflict(db.message().to_string());
        }
    }
    tracing::error!(error = %err, "database operation failed");
    StoreError::Backend(err.to_string())
}
