//! # Repository and Transaction Contracts
//!
//! The persistence boundary consumed by the merge workflow. Implementations
//! live in [`crate::memory`] and in the Postgres layer of `prr-api`.
//!
//! ## Transactional scope
//!
//! [`TransactionManager::begin`] hands out an owned scope. Repository calls
//! borrow it mutably, so every read and write of one workflow run goes
//! through the same transaction. [`TransactionManager::commit`] consumes the
//! scope; dropping it instead rolls everything back. That includes the drop
//! that happens when the caller cancels the workflow future.
//!
//! ## Locking
//!
//! [`PullRequestRepository::get_pull_request_by_id`] must lock the pull
//! request for the remainder of the scope, so two concurrent merges of the
//! same pull request serialize and the second one observes `MERGED`.

use async_trait::async_trait;
use prr_core::{
    PullRequest, PullRequestId, ReviewerAssignment, StatusId, StatusRecord, StatusValue,
};
use thiserror::Error;

/// The kind of record a store lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    /// A pull request row.
    PullRequest,
    /// A status row.
    Status,
    /// Reviewer assignment rows.
    Reviewers,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::PullRequest => "pull request",
            Self::Status => "status",
            Self::Reviewers => "reviewer assignments",
        };
        f.write_str(s)
    }
}

/// Failure reported by a repository or transaction manager.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record matched the lookup key.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What was being looked up.
        entity: Entity,
        /// The lookup key, rendered for diagnostics.
        id: String,
    },

    /// The write collided with existing data (duplicate key, lost race).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other backend failure (connection, query, decoding).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::NotFound`].
    pub fn not_found(entity: Entity, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this is a "no matching record" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Opens and commits transactional scopes.
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// The scope handed to repository calls. Dropping it uncommitted rolls back.
    type Scope: Send + 'static;

    /// Open a new scope.
    async fn begin(&self) -> Result<Self::Scope, StoreError>;

    /// Commit every write performed through `scope`.
    async fn commit(&self, scope: Self::Scope) -> Result<(), StoreError>;
}

/// Access to pull request records.
#[async_trait]
pub trait PullRequestRepository<S: Send>: Send + Sync {
    /// Fetch and lock a pull request. Missing rows yield [`StoreError::NotFound`].
    async fn get_pull_request_by_id(
        &self,
        scope: &mut S,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError>;

    /// Stamp the merge time (chosen by the store) and return the updated record.
    async fn mark_pull_request_merged_by_id(
        &self,
        scope: &mut S,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError>;

    /// Insert a new pull request.
    async fn save_pull_request(
        &self,
        scope: &mut S,
        pull_request: &PullRequest,
    ) -> Result<PullRequest, StoreError>;
}

/// Access to status records.
#[async_trait]
pub trait StatusRepository<S: Send>: Send + Sync {
    /// Fetch a status record.
    async fn get_status_by_id(&self, scope: &mut S, id: StatusId)
        -> Result<StatusRecord, StoreError>;

    /// Overwrite a status value and return the updated record.
    async fn update_status_by_id(
        &self,
        scope: &mut S,
        id: StatusId,
        status: StatusValue,
    ) -> Result<StatusRecord, StoreError>;

    /// Insert a new status record.
    async fn save_status(
        &self,
        scope: &mut S,
        status: &StatusRecord,
    ) -> Result<StatusRecord, StoreError>;
}

/// Access to reviewer assignments.
#[async_trait]
pub trait ReviewerRepository<S: Send>: Send + Sync {
    /// All assignments for a pull request, in no particular order.
    ///
    /// Stores may report "no rows" either as an empty list or as
    /// [`StoreError::NotFound`]; callers must treat both as empty.
    async fn get_reviewers_by_pull_request_id(
        &self,
        scope: &mut S,
        id: PullRequestId,
    ) -> Result<Vec<ReviewerAssignment>, StoreError>;

    /// Record a new assignment.
    async fn save_reviewer(
        &self,
        scope: &mut S,
        assignment: &ReviewerAssignment,
    ) -> Result<ReviewerAssignment, StoreError>;
}
