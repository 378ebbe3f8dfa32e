//! # Merge Outcomes
//!
//! A successful call to the workflow is one of two cases, and the caller
//! always gets the authoritative pull request state back:
//!
//! - [`MergeOutcome::Merged`]: this call performed the transition.
//! - [`MergeOutcome::AlreadyMerged`]: the pull request was already terminal;
//!   nothing was written.
//!
//! Failures travel on the `Err` side as [`crate::MergeError`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use prr_core::{PullRequest, PullRequestId, StatusValue, UserId};

/// Consolidated view of a pull request: record, status and reviewers.
///
/// Returned by merges and by creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// The pull request.
    pub pull_request_id: PullRequestId,
    /// Its title.
    pub pull_request_name: String,
    /// Its author.
    pub author_id: UserId,
    /// Status value after the call.
    pub status: StatusValue,
    /// Assigned reviewers. Ordered by id; the store's order is not preserved.
    pub assigned_reviewers: BTreeSet<UserId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Merge time, `None` only if the store never stamped one.
    pub merged_at: Option<DateTime<Utc>>,
}

impl MergeResult {
    /// Combine a pull request record, its status and its reviewers.
    pub fn from_parts(
        pull_request: PullRequest,
        status: StatusValue,
        assigned_reviewers: BTreeSet<UserId>,
    ) -> Self {
        Self {
            pull_request_id: pull_request.id,
            pull_request_name: pull_request.name,
            author_id: pull_request.author_id,
            status,
            assigned_reviewers,
            created_at: pull_request.created_at,
            merged_at: pull_request.merged_at,
        }
    }
}

/// The two non-failure results of a merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// This call moved the pull request to `MERGED`.
    Merged(MergeResult),
    /// The pull request was already `MERGED`; no mutation was performed.
    AlreadyMerged(MergeResult),
}

impl MergeOutcome {
    /// The pull request state, regardless of which case occurred.
    pub fn result(&self) -> &MergeResult {
        match self {
            Self::Merged(result) | Self::AlreadyMerged(result) => result,
        }
    }

    /// Consume the outcome, keeping the pull request state.
    pub fn into_result(self) -> MergeResult {
        match self {
            Self::Merged(result) | Self::AlreadyMerged(result) => result,
        }
    }

    /// Whether this call performed the transition.
    pub fn was_transitioned(&self) -> bool {
        matches!(self, Self::Merged(_))
    }
}
