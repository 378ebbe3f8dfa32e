//! # Merge Workflow
//!
//! Runs one merge request inside one transactional scope:
//!
//! ```text
//! begin ─► get pull request (locks row) ─► get status ─► get reviewers
//!                                                           │
//!                       status == MERGED ◄──────────────────┤
//!                       commit, AlreadyMerged               │ otherwise
//!                                                           ▼
//!                       update status ─► mark merged ─► commit, Merged
//! ```
//!
//! Any failure returns early and drops the scope, which rolls back every
//! write made so far. No step is retried here.

use std::collections::BTreeSet;

use async_trait::async_trait;
use prr_core::{PullRequestId, StatusValue, UserId};

use crate::error::MergeError;
use crate::outcome::{MergeOutcome, MergeResult};
use crate::repository::{
    PullRequestRepository, ReviewerRepository, StatusRepository, TransactionManager,
};

/// Object-safe entry point for transports.
#[async_trait]
pub trait MergePullRequest: Send + Sync {
    /// Merge a pull request, or report that it is already merged.
    async fn merge_pull_request(&self, id: PullRequestId) -> Result<MergeOutcome, MergeError>;
}

/// The merge workflow over a transaction manager and three repositories.
#[derive(Debug, Clone)]
pub struct MergeWorkflow<M, P, S, R> {
    manager: M,
    pull_requests: P,
    statuses: S,
    reviewers: R,
}

impl<M, P, S, R> MergeWorkflow<M, P, S, R>
where
    M: TransactionManager,
    P: PullRequestRepository<M::Scope>,
    S: StatusRepository<M::Scope>,
    R: ReviewerRepository<M::Scope>,
{
    /// Wire the workflow to its collaborators.
    pub fn new(manager: M, pull_requests: P, statuses: S, reviewers: R) -> Self {
        Self {
            manager,
            pull_requests,
            statuses,
            reviewers,
        }
    }

    /// Merge the pull request `id`.
    #[tracing::instrument(name = "merge_pull_request", skip_all, fields(pull_request_id = %id))]
    pub async fn merge(&self, id: PullRequestId) -> Result<MergeOutcome, MergeError> {
        let mut scope = self
            .manager
            .begin()
            .await
            .map_err(|source| MergeError::Transaction { id, source })?;

        let outcome = self.merge_in_scope(&mut scope, id).await?;

        self.manager
            .commit(scope)
            .await
            .map_err(|source| MergeError::Transaction { id, source })?;

        match &outcome {
            MergeOutcome::Merged(_) => tracing::debug!("pull request merged"),
            MergeOutcome::AlreadyMerged(_) => {
                tracing::debug!("pull request already merged, returned current state")
            }
        }
        Ok(outcome)
    }

    async fn merge_in_scope(
        &self,
        scope: &mut M::Scope,
        id: PullRequestId,
    ) -> Result<MergeOutcome, MergeError> {
        tracing::debug!("get pull request");
        let pull_request = self
            .pull_requests
            .get_pull_request_by_id(scope, id)
            .await
            .map_err(|source| {
                if source.is_not_found() {
                    MergeError::PullRequestNotFound { id }
                } else {
                    MergeError::GetPullRequest { id, source }
                }
            })?;

        let status_id = pull_request.status_id;
        let current = self
            .statuses
            .get_status_by_id(scope, status_id)
            .await
            .map_err(|source| MergeError::GetStatus { status_id, source })?;

        tracing::debug!("get assigned reviewers");
        let assignments = match self
            .reviewers
            .get_reviewers_by_pull_request_id(scope, id)
            .await
        {
            Ok(assignments) => assignments,
            Err(source) if source.is_not_found() => {
                tracing::debug!("reviewer store reported no rows, treating as unassigned");
                Vec::new()
            }
            Err(source) => return Err(MergeError::GetReviewers { id, source }),
        };
        let reviewers: BTreeSet<UserId> = assignments.iter().map(|a| a.reviewer_id).collect();

        tracing::debug!(current_status = %current.status, "check pr status");
        if current.status.is_terminal() {
            return Ok(MergeOutcome::AlreadyMerged(MergeResult::from_parts(
                pull_request,
                current.status,
                reviewers,
            )));
        }

        let updated = self
            .statuses
            .update_status_by_id(scope, current.id, StatusValue::MERGED)
            .await
            .map_err(|source| MergeError::UpdateStatus { id, source })?;

        tracing::debug!("mark pull request merged");
        let merged = self
            .pull_requests
            .mark_pull_request_merged_by_id(scope, id)
            .await
            .map_err(|source| MergeError::UpdateMergeTime { id, source })?;

        Ok(MergeOutcome::Merged(MergeResult::from_parts(
            merged,
            updated.status,
            reviewers,
        )))
    }
}

#[async_trait]
impl<M, P, S, R> MergePullRequest for MergeWorkflow<M, P, S, R>
where
    M: TransactionManager,
    P: PullRequestRepository<M::Scope>,
    S: StatusRepository<M::Scope>,
    R: ReviewerRepository<M::Scope>,
{
    async fn merge_pull_request(&self, id: PullRequestId) -> Result<MergeOutcome, MergeError> {
        self.merge(id).await
    }
}
