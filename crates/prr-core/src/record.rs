//! # Persisted Records
//!
//! The three entities the merge workflow reads and writes. All of them are
//! created by upstream processes (pull request creation, reviewer
//! assignment); nothing in this workspace deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{AssignmentId, PullRequestId, StatusId, UserId};
use crate::status::StatusValue;

/// A pull request as stored by the persistence layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Unique identifier.
    pub id: PullRequestId,
    /// Human-readable title.
    pub name: String,
    /// The user who opened the pull request.
    pub author_id: UserId,
    /// The status record this pull request currently references.
    pub status_id: StatusId,
    /// When the pull request was created.
    pub created_at: DateTime<Utc>,
    /// When the pull request was merged. `None` until merged.
    pub merged_at: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Build an unmerged pull request record.
    pub fn new(
        id: PullRequestId,
        name: impl Into<String>,
        author_id: UserId,
        status_id: StatusId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            author_id,
            status_id,
            created_at,
            merged_at: None,
        }
    }
}

/// A pull request's review status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Unique identifier.
    pub id: StatusId,
    /// Current status value.
    pub status: StatusValue,
}

/// One reviewer assigned to one pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewerAssignment {
    /// Unique identifier of the assignment row.
    pub id: AssignmentId,
    /// The pull request under review.
    pub pull_request_id: PullRequestId,
    /// The assigned reviewer.
    pub reviewer_id: UserId,
}

impl ReviewerAssignment {
    /// Assign `reviewer_id` to `pull_request_id` under a fresh assignment id.
    pub fn new(pull_request_id: PullRequestId, reviewer_id: UserId) -> Self {
        Self {
            id: AssignmentId::new(),
            pull_request_id,
            reviewer_id,
        }
    }
}
