//! Pull request persistence.
//!
//! Reads lock the row (`FOR UPDATE`) for the rest of the transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use prr_core::{PullRequest, PullRequestId, StatusId, UserId};
use prr_merge::{Entity, PullRequestRepository, StoreError};
use uuid::Uuid;

use super::transaction::{backend_error, PgScope};

/// [`PullRequestRepository`] over the `pull_requests` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgPullRequestRepository;

#[async_trait]
impl PullRequestRepository<PgScope> for PgPullRequestRepository {
    async fn get_pull_request_by_id(
        &self,
        scope: &mut PgScope,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            "SELECT id, name, author_id, status_id, created_at, merged_at
             FROM pull_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut **scope)
        .await
        .map_err(backend_error)?;

        row.map(PullRequestRow::into_record)
            .ok_or_else(|| StoreError::not_found(Entity::PullRequest, id))
    }

    async fn mark_pull_request_merged_by_id(
        &self,
        scope: &mut PgScope,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            "UPDATE pull_requests SET merged_at = NOW() WHERE id = $1
             RETURNING id, name, author_id, status_id, created_at, merged_at",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut **scope)
        .await
        .map_err(backend_error)?;

        row.map(PullRequestRow::into_record)
            .ok_or_else(|| StoreError::not_found(Entity::PullRequest, id))
    }

    async fn save_pull_request(
        &self,
        scope: &mut PgScope,
        pull_request: &PullRequest,
    ) -> Result<PullRequest, StoreError> {
        let row = sqlx::query_as::<_, PullRequestRow>(
            "INSERT INTO pull_requests (id, name, author_id, status_id, created_at, merged_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, name, author_id, status_id, created_at, merged_at",
        )
        .bind(*pull_request.id.as_uuid())
        .bind(&pull_request.name)
        .bind(*pull_request.author_id.as_uuid())
        .bind(*pull_request.status_id.as_uuid())
        .bind(pull_request.created_at)
        .bind(pull_request.merged_at)
        .fetch_one(&mut **scope)
        .await
        .map_err(backend_error)?;

        Ok(row.into_record())
    }
}

/// Internal row type for sqlx deserialization.
#[derive(sqlx::FromRow)]
struct PullRequestRow {
    id: Uuid,
    name: String,
    author_id: Uuid,
    status_id: Uuid,
    created_at: DateTime<Utc>,
    merged_at: Option<DateTime<Utc>>,
}

impl PullRequestRow {
    fn into_record(self) -> PullRequest {
        PullRequest {
            id: PullRequestId::from_uuid(self.id),
            name: self.name,
            author_id: UserId::from_uuid(self.author_id),
            status_id: StatusId::from_uuid(self.status_id),
            created_at: self.created_at,
            merged_at: self.merged_at,
        }
    }
}
