//! Reviewer assignment persistence over the `pr_reviewers` table.
//!
//! A pull request with no assignments yields an empty list.

use async_trait::async_trait;
use prr_core::{AssignmentId, PullRequestId, ReviewerAssignment, UserId};
use prr_merge::{ReviewerRepository, StoreError};
use uuid::Uuid;

use super::transaction::{backend_error, PgScope};

/// [`ReviewerRepository`] over the `pr_reviewers` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgReviewerRepository;

#[async_trait]
impl ReviewerRepository<PgScope> for PgReviewerRepository {
    async fn get_reviewers_by_pull_request_id(
        &self,
        scope: &mut PgScope,
        id: PullRequestId,
    ) -> Result<Vec<ReviewerAssignment>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewerRow>(
            "SELECT id, pr_id, reviewer_id FROM pr_reviewers WHERE pr_id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_all(&mut **scope)
        .await
        .map_err(backend_error)?;

        Ok(rows.into_iter().map(ReviewerRow::into_record).collect())
    }

    async fn save_reviewer(
        &self,
        scope: &mut PgScope,
        assignment: &ReviewerAssignment,
    ) -> Result<ReviewerAssignment, StoreError> {
        let row = sqlx::query_as::<_, ReviewerRow>(
            "INSERT INTO pr_reviewers (id, pr_id, reviewer_id) VALUES ($1, $2, $3)
             RETURNING id, pr_id, reviewer_id",
        )
        .bind(*assignment.id.as_uuid())
        .bind(*assignment.pull_request_id.as_uuid())
        .bind(*assignment.reviewer_id.as_uuid())
        .fetch_one(&mut **scope)
        .await
        .map_err(backend_error)?;

        Ok(row.into_record())
    }
}

#[derive(sqlx::FromRow)]
struct ReviewerRow {
    id: Uuid,
    pr_id: Uuid,
    reviewer_id: Uuid,
}

impl ReviewerRow {
    fn into_record(self) -> ReviewerAssignment {
        ReviewerAssignment {
            id: AssignmentId::from_uuid(self.id),
            pull_request_id: PullRequestId::from_uuid(self.pr_id),
            reviewer_id: UserId::from_uuid(self.reviewer_id),
        }
    }
}
