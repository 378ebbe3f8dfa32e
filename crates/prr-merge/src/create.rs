//! # Pull Request Creation
//!
//! The upstream path that produces what the merge workflow consumes. One
//! scope covers the whole creation:
//!
//! ```text
//! begin ─► get pull request ─► exists? ─► AlreadyExists
//!                                 │ no
//!                                 ▼
//!          save OPEN status ─► save pull request ─► save each reviewer ─► commit
//! ```
//!
//! Reviewers are deduplicated and the author is never assigned to their own
//! pull request. A failure at any step drops the scope, so a half-created
//! pull request is never visible.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use prr_core::{
    Clock, PullRequest, PullRequestId, ReviewerAssignment, StatusId, StatusRecord, StatusValue,
    UserId,
};
use thiserror::Error;

use crate::outcome::MergeResult;
use crate::repository::{
    PullRequestRepository, ReviewerRepository, StatusRepository, StoreError, TransactionManager,
};

/// Input to [`CreateWorkflow::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    /// Caller-chosen identifier.
    pub id: PullRequestId,
    /// Title.
    pub name: String,
    /// Author.
    pub author_id: UserId,
    /// Requested reviewers. Duplicates and the author are dropped.
    pub reviewers: Vec<UserId>,
}

impl NewPullRequest {
    /// The reviewers that will actually be assigned.
    pub fn effective_reviewers(&self) -> BTreeSet<UserId> {
        self.reviewers
            .iter()
            .copied()
            .filter(|reviewer| *reviewer != self.author_id)
            .collect()
    }
}

/// A failed creation. Nothing was persisted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateError {
    /// A pull request with this identifier already exists.
    #[error("pull request already exists: {id}")]
    AlreadyExists {
        /// The requested identifier.
        id: PullRequestId,
    },

    /// Checking for an existing pull request failed.
    #[error("failed to check pull request {id}: {source}")]
    GetPullRequest {
        /// The requested identifier.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Saving the `OPEN` status record failed.
    #[error("failed to save pr status for pull request {id}: {source}")]
    SaveStatus {
        /// The pull request being created.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Saving the pull request record failed.
    #[error("failed to save pull request {id}: {source}")]
    SavePullRequest {
        /// The pull request being created.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Assigning a reviewer failed.
    #[error("failed to assign reviewer {reviewer_id} to pull request {id}: {source}")]
    AssignReviewer {
        /// The pull request being created.
        id: PullRequestId,
        /// The reviewer whose assignment failed.
        reviewer_id: UserId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Opening or committing the transactional scope failed.
    #[error("transaction failed while creating pull request {id}: {source}")]
    Transaction {
        /// The pull request being created.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },
}

/// Object-safe entry point for transports.
#[async_trait]
pub trait CreatePullRequest: Send + Sync {
    /// Create an `OPEN` pull request with its reviewers.
    async fn create_pull_request(&self, new: NewPullRequest) -> Result<MergeResult, CreateError>;
}

/// Creation over a transaction manager and three repositories.
#[derive(Clone)]
pub struct CreateWorkflow<M, P, S, R> {
    manager: M,
    pull_requests: P,
    statuses: S,
    reviewers: R,
    clock: Arc<dyn Clock>,
}

impl<M, P, S, R> std::fmt::Debug for CreateWorkflow<M, P, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateWorkflow").finish_non_exhaustive()
    }
}

impl<M, P, S, R> CreateWorkflow<M, P, S, R>
where
    M: TransactionManager,
    P: PullRequestRepository<M::Scope>,
    S: StatusRepository<M::Scope>,
    R: ReviewerRepository<M::Scope>,
{
    /// Wire the workflow. `clock` supplies `created_at`.
    pub fn new(
        manager: M,
        pull_requests: P,
        statuses: S,
        reviewers: R,
        clock: impl Clock + 'static,
    ) -> Self {
        Self {
            manager,
            pull_requests,
            statuses,
            reviewers,
            clock: Arc::new(clock),
        }
    }

    /// Create the pull request described by `new`.
    #[tracing::instrument(name = "create_pull_request", skip_all, fields(pull_request_id = %new.id))]
    pub async fn create(&self, new: NewPullRequest) -> Result<MergeResult, CreateError> {
        let id = new.id;
        let mut scope = self
            .manager
            .begin()
            .await
            .map_err(|source| CreateError::Transaction { id, source })?;

        let created = self.create_in_scope(&mut scope, new).await?;

        self.manager
            .commit(scope)
            .await
            .map_err(|source| CreateError::Transaction { id, source })?;

        tracing::debug!(
            reviewers = created.assigned_reviewers.len(),
            "pull request created"
        );
        Ok(created)
    }

    async fn create_in_scope(
        &self,
        scope: &mut M::Scope,
        new: NewPullRequest,
    ) -> Result<MergeResult, CreateError> {
        let id = new.id;

        tracing::debug!("check pull request existence");
        match self.pull_requests.get_pull_request_by_id(scope, id).await {
            Ok(_) => return Err(CreateError::AlreadyExists { id }),
            Err(source) if source.is_not_found() => {}
            Err(source) => return Err(CreateError::GetPullRequest { id, source }),
        }

        let status = self
            .statuses
            .save_status(
                scope,
                &StatusRecord {
                    id: StatusId::new(),
                    status: StatusValue::OPEN,
                },
            )
            .await
            .map_err(|source| CreateError::SaveStatus { id, source })?;

        let reviewers = new.effective_reviewers();
        let record = PullRequest::new(id, new.name, new.author_id, status.id, self.clock.now());
        let created = self
            .pull_requests
            .save_pull_request(scope, &record)
            .await
            .map_err(|source| match source {
                // A concurrent creation won the insert.
                StoreError::Conflict(_) => CreateError::AlreadyExists { id },
                source => CreateError::SavePullRequest { id, source },
            })?;

        tracing::debug!(count = reviewers.len(), "assign reviewers");
        for reviewer_id in &reviewers {
            self.reviewers
                .save_reviewer(scope, &ReviewerAssignment::new(id, *reviewer_id))
                .await
                .map_err(|source| CreateError::AssignReviewer {
                    id,
                    reviewer_id: *reviewer_id,
                    source,
                })?;
        }

        Ok(MergeResult::from_parts(created, status.status, reviewers))
    }
}

#[async_trait]
impl<M, P, S, R> CreatePullRequest for CreateWorkflow<M, P, S, R>
where
    M: TransactionManager,
    P: PullRequestRepository<M::Scope>,
    S: StatusRepository<M::Scope>,
    R: ReviewerRepository<M::Scope>,
{
    async fn create_pull_request(&self, new: NewPullRequest) -> Result<MergeResult, CreateError> {
        self.create(new).await
    }
}
