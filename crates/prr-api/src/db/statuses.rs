//! Status persistence over the `pr_statuses` table.

use async_trait::async_trait;
use prr_core::{StatusId, StatusRecord, StatusValue};
use prr_merge::{Entity, StatusRepository, StoreError};
use uuid::Uuid;

use super::transaction::{backend_error, PgScope};

/// [`StatusRepository`] over the `pr_statuses` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgStatusRepository;

#[async_trait]
impl StatusRepository<PgScope> for PgStatusRepository {
    async fn get_status_by_id(
        &self,
        scope: &mut PgScope,
        id: StatusId,
    ) -> Result<StatusRecord, StoreError> {
        let row = sqlx::query_as::<_, StatusRow>(
            "SELECT id, status FROM pr_statuses WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut **scope)
        .await
        .map_err(backend_error)?;

        row.ok_or_else(|| StoreError::not_found(Entity::Status, id))?
            .into_record()
    }

    async fn update_status_by_id(
        &self,
        scope: &mut PgScope,
        id: StatusId,
        status: StatusValue,
    ) -> Result<StatusRecord, StoreError> {
        let row = sqlx::query_as::<_, StatusRow>(
            "UPDATE pr_statuses SET status = $1 WHERE id = $2 RETURNING id, status",
        )
        .bind(status.as_str())
        .bind(*id.as_uuid())
        .fetch_optional(&mut **scope)
        .await
        .map_err(backend_error)?;

        row.ok_or_else(|| StoreError::not_found(Entity::Status, id))?
            .into_record()
    }

    async fn save_status(
        &self,
        scope: &mut PgScope,
        status: &StatusRecord,
    ) -> Result<StatusRecord, StoreError> {
        sqlx::query_as::<_, StatusRow>(
            "INSERT INTO pr_statuses (id, status) VALUES ($1, $2) RETURNING id, status",
        )
        .bind(*status.id.as_uuid())
        .bind(status.status.as_str())
        .fetch_one(&mut **scope)
        .await
        .map_err(backend_error)?
        .into_record()
    }
}

#[derive(sqlx::FromRow)]
struct StatusRow {
    id: Uuid,
    status: String,
}

impl StatusRow {
    fn into_record(self) -> Result<StatusRecord, StoreError> {
        let status = StatusValue::new(self.status).map_err(|e| {
            tracing::error!(status_id = %self.id, error = %e, "stored status value is invalid");
            StoreError::Backend(e.to_string())
        })?;
        Ok(StatusRecord {
            id: StatusId::from_uuid(self.id),
            status,
        })
    }
}
