//! # Merge Errors
//!
//! Every failure the workflow can produce, each carrying the identifier it
//! failed on and, where one exists, the underlying [`StoreError`].
//!
//! Transports should not match on individual variants to pick a response.
//! [`MergeError::kind`] collapses them into the closed [`ErrorKind`] set,
//! and the compiler enforces that every variant is classified.
//!
//! "Already merged" is deliberately absent: it is an outcome
//! ([`crate::MergeOutcome::AlreadyMerged`]), not a failure.

use prr_core::{PullRequestId, StatusId};
use thiserror::Error;

use crate::repository::StoreError;

/// A failed merge request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// No pull request exists with this identifier.
    #[error("pull request not found: {id}")]
    PullRequestNotFound {
        /// The requested pull request.
        id: PullRequestId,
    },

    /// Fetching the pull request failed for a reason other than absence.
    #[error("failed to get pull request {id}: {source}")]
    GetPullRequest {
        /// The requested pull request.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Fetching the referenced status record failed.
    #[error("failed to get pr status {status_id}: {source}")]
    GetStatus {
        /// The status record the pull request references.
        status_id: StatusId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Fetching reviewer assignments failed.
    #[error("failed to get assigned reviewers for pull request {id}: {source}")]
    GetReviewers {
        /// The pull request whose reviewers were requested.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Writing the `MERGED` status failed. Nothing was persisted.
    #[error("failed to update pr status for pull request {id}: {source}")]
    UpdateStatus {
        /// The pull request being merged.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Stamping the merge time failed. The status update was rolled back.
    #[error("failed to update pr merge time for pull request {id}: {source}")]
    UpdateMergeTime {
        /// The pull request being merged.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },

    /// Opening or committing the transactional scope failed.
    #[error("transaction failed while merging pull request {id}: {source}")]
    Transaction {
        /// The pull request being merged.
        id: PullRequestId,
        /// Underlying store failure.
        source: StoreError,
    },
}

/// Which read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadTarget {
    /// The pull request record.
    PullRequest,
    /// The status record.
    Status,
    /// The reviewer assignments.
    Reviewers,
}

/// Which write failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteTarget {
    /// The status update.
    Status,
    /// The merge-time stamp.
    MergeTime,
}

/// Closed classification of [`MergeError`] for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The pull request does not exist. Not retryable.
    NotFound,
    /// A store read failed.
    ReadFailure(ReadTarget),
    /// A store write failed; the transaction was rolled back.
    WriteFailure(WriteTarget),
    /// Anything else (transaction plumbing).
    Unclassified,
}

impl ErrorKind {
    /// Whether a caller may reasonably retry the same request.
    ///
    /// The workflow itself never retries.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

impl MergeError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PullRequestNotFound { .. } => ErrorKind::NotFound,
            Self::GetPullRequest { .. } => ErrorKind::ReadFailure(ReadTarget::PullRequest),
            Self::GetStatus { .. } => ErrorKind::ReadFailure(ReadTarget::Status),
            Self::GetReviewers { .. } => ErrorKind::ReadFailure(ReadTarget::Reviewers),
            Self::UpdateStatus { .. } => ErrorKind::WriteFailure(WriteTarget::Status),
            Self::UpdateMergeTime { .. } => ErrorKind::WriteFailure(WriteTarget::MergeTime),
            Self::Transaction { .. } => ErrorKind::Unclassified,
        }
    }

    /// The underlying store failure, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            Self::PullRequestNotFound { .. } => None,
            Self::GetPullRequest { source, .. }
            | Self::GetStatus { source, .. }
            | Self::GetReviewers { source, .. }
            | Self::UpdateStatus { source, .. }
            | Self::UpdateMergeTime { source, .. }
            | Self::Transaction { source, .. } => Some(source),
        }
    }
}
