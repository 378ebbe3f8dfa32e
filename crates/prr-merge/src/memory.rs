//! # In-Memory Backend
//!
//! A transactional, process-local implementation of every contract in
//! [`crate::repository`]. Used for development mode (no database configured)
//! and as the backing store of the workflow tests.
//!
//! ## Isolation
//!
//! [`MemoryDatabase::begin`] takes an owned lock on the whole table set and
//! stages a private copy. Repository calls only touch the copy.
//! [`MemoryDatabase::commit`] publishes the copy and releases the lock;
//! dropping the [`MemoryScope`] discards it. Scopes therefore run one at a
//! time (serializable isolation), and the lock is never held outside a
//! scope, so a cancelled workflow releases it when its future is dropped.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use prr_core::{
    Clock, PullRequest, PullRequestId, ReviewerAssignment, StatusId, StatusRecord, StatusValue,
    SystemClock, UserId,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::repository::{
    Entity, PullRequestRepository, ReviewerRepository, StatusRepository, StoreError,
    TransactionManager,
};
use crate::create::CreateWorkflow;
use crate::workflow::MergeWorkflow;

/// A merge workflow wired entirely to the in-memory backend.
pub type MemoryMergeWorkflow = MergeWorkflow<
    MemoryDatabase,
    MemoryPullRequestRepository,
    MemoryStatusRepository,
    MemoryReviewerRepository,
>;

/// A creation workflow wired entirely to the in-memory backend.
pub type MemoryCreateWorkflow = CreateWorkflow<
    MemoryDatabase,
    MemoryPullRequestRepository,
    MemoryStatusRepository,
    MemoryReviewerRepository,
>;

#[derive(Debug, Clone, Default)]
struct Tables {
    pull_requests: HashMap<PullRequestId, PullRequest>,
    statuses: HashMap<StatusId, StatusRecord>,
    assignments: Vec<ReviewerAssignment>,
}

/// Shared handle to the in-memory tables. Cloning shares the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<Tables>>,
}

/// An open in-memory transaction.
#[derive(Debug)]
pub struct MemoryScope {
    _lock: OwnedMutexGuard<Tables>,
    staged: Tables,
}

impl MemoryDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a merge workflow over this database, stamping merge times from `clock`.
    pub fn merge_workflow(&self, clock: impl Clock + 'static) -> MemoryMergeWorkflow {
        MergeWorkflow::new(
            self.clone(),
            MemoryPullRequestRepository::new(clock),
            MemoryStatusRepository,
            MemoryReviewerRepository,
        )
    }

    /// Build a creation workflow over this database, stamping `created_at`
    /// from `clock`.
    pub fn create_workflow(&self, clock: impl Clock + Clone + 'static) -> MemoryCreateWorkflow {
        CreateWorkflow::new(
            self.clone(),
            MemoryPullRequestRepository::new(clock.clone()),
            MemoryStatusRepository,
            MemoryReviewerRepository,
            clock,
        )
    }

    /// Insert a pull request together with its status record and reviewer
    /// assignments, committed as one unit.
    pub async fn seed(
        &self,
        pull_request: PullRequest,
        status: StatusValue,
        reviewers: &[UserId],
    ) -> Result<(), StoreError> {
        let mut scope = self.begin().await?;
        MemoryStatusRepository
            .save_status(
                &mut scope,
                &StatusRecord {
                    id: pull_request.status_id,
                    status,
                },
            )
            .await?;
        MemoryPullRequestRepository::new(SystemClock)
            .save_pull_request(&mut scope, &pull_request)
            .await?;
        for reviewer in reviewers {
            MemoryReviewerRepository
                .save_reviewer(
                    &mut scope,
                    &ReviewerAssignment::new(pull_request.id, *reviewer),
                )
                .await?;
        }
        self.commit(scope).await
    }

    /// Committed copy of a pull request.
    pub async fn pull_request(&self, id: PullRequestId) -> Option<PullRequest> {
        self.tables.lock().await.pull_requests.get(&id).cloned()
    }

    /// Committed copy of a status record.
    pub async fn status(&self, id: StatusId) -> Option<StatusRecord> {
        self.tables.lock().await.statuses.get(&id).cloned()
    }
}

#[async_trait]
impl TransactionManager for MemoryDatabase {
    type Scope = MemoryScope;

    async fn begin(&self) -> Result<MemoryScope, StoreError> {
        let lock = Arc::clone(&self.tables).lock_owned().await;
        let staged = lock.clone();
        Ok(MemoryScope {
            _lock: lock,
            staged,
        })
    }

    async fn commit(&self, scope: MemoryScope) -> Result<(), StoreError> {
        let MemoryScope { _lock: mut lock, staged } = scope;
        *lock = staged;
        Ok(())
    }
}

/// In-memory pull request repository.
#[derive(Clone)]
pub struct MemoryPullRequestRepository {
    clock: Arc<dyn Clock>,
}

impl MemoryPullRequestRepository {
    /// Create a repository that stamps merge times from `clock`.
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }
}

impl std::fmt::Debug for MemoryPullRequestRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryPullRequestRepository").finish_non_exhaustive()
    }
}

#[async_trait]
impl PullRequestRepository<MemoryScope> for MemoryPullRequestRepository {
    async fn get_pull_request_by_id(
        &self,
        scope: &mut MemoryScope,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError> {
        scope
            .staged
            .pull_requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::PullRequest, id))
    }

    async fn mark_pull_request_merged_by_id(
        &self,
        scope: &mut MemoryScope,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError> {
        let now = self.clock.now();
        let record = scope
            .staged
            .pull_requests
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Entity::PullRequest, id))?;
        record.merged_at = Some(now);
        Ok(record.clone())
    }

    async fn save_pull_request(
        &self,
        scope: &mut MemoryScope,
        pull_request: &PullRequest,
    ) -> Result<PullRequest, StoreError> {
        if scope.staged.pull_requests.contains_key(&pull_request.id) {
            return Err(StoreError::Conflict(format!(
                "pull request {} already exists",
                pull_request.id
            )));
        }
        scope
            .staged
            .pull_requests
            .insert(pull_request.id, pull_request.clone());
        Ok(pull_request.clone())
    }
}

/// In-memory status repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStatusRepository;

#[async_trait]
impl StatusRepository<MemoryScope> for MemoryStatusRepository {
    async fn get_status_by_id(
        &self,
        scope: &mut MemoryScope,
        id: StatusId,
    ) -> Result<StatusRecord, StoreError> {
        scope
            .staged
            .statuses
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::Status, id))
    }

    async fn update_status_by_id(
        &self,
        scope: &mut MemoryScope,
        id: StatusId,
        status: StatusValue,
    ) -> Result<StatusRecord, StoreError> {
        let record = scope
            .staged
            .statuses
            .get_mut(&id)
            .ok_or_else(|| StoreError::not_found(Entity::Status, id))?;
        record.status = status;
        Ok(record.clone())
    }

    async fn save_status(
        &self,
        scope: &mut MemoryScope,
        status: &StatusRecord,
    ) -> Result<StatusRecord, StoreError> {
        if scope.staged.statuses.contains_key(&status.id) {
            return Err(StoreError::Conflict(format!(
                "status {} already exists",
                status.id
            )));
        }
        scope.staged.statuses.insert(status.id, status.clone());
        Ok(status.clone())
    }
}

/// In-memory reviewer assignment repository. Reports "no rows" as an empty list.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryReviewerRepository;

#[async_trait]
impl ReviewerRepository<MemoryScope> for MemoryReviewerRepository {
    async fn get_reviewers_by_pull_request_id(
        &self,
        scope: &mut MemoryScope,
        id: PullRequestId,
    ) -> Result<Vec<ReviewerAssignment>, StoreError> {
        Ok(scope
            .staged
            .assignments
            .iter()
            .filter(|a| a.pull_request_id == id)
            .cloned()
            .collect())
    }

    async fn save_reviewer(
        &self,
        scope: &mut MemoryScope,
        assignment: &ReviewerAssignment,
    ) -> Result<ReviewerAssignment, StoreError> {
        let duplicate = scope.staged.assignments.iter().any(|a| {
            a.pull_request_id == assignment.pull_request_id
                && a.reviewer_id == assignment.reviewer_id
        });
        if duplicate {
            return Err(StoreError::Conflict(format!(
                "reviewer {} already assigned to pull request {}",
                assignment.reviewer_id, assignment.pull_request_id
            )));
        }
        scope.staged.assignments.push(assignment.clone());
        Ok(assignment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pull_request() -> PullRequest {
        PullRequest::new(
            PullRequestId::new(),
            "Bump dependencies",
            UserId::new(),
            StatusId::new(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn dropped_scope_discards_writes() {
        let db = MemoryDatabase::new();
        let pr = pull_request();
        db.seed(pr.clone(), StatusValue::OPEN, &[]).await.unwrap();

        {
            let mut scope = db.begin().await.unwrap();
            MemoryStatusRepository
                .update_status_by_id(&mut scope, pr.status_id, StatusValue::MERGED)
                .await
                .unwrap();
        }

        assert_eq!(db.status(pr.status_id).await.unwrap().status, StatusValue::OPEN);
    }

    #[tokio::test]
    async fn committed_scope_publishes_writes() {
        let db = MemoryDatabase::new();
        let pr = pull_request();
        db.seed(pr.clone(), StatusValue::OPEN, &[]).await.unwrap();

        let mut scope = db.begin().await.unwrap();
        MemoryStatusRepository
            .update_status_by_id(&mut scope, pr.status_id, StatusValue::MERGED)
            .await
            .unwrap();
        db.commit(scope).await.unwrap();

        assert_eq!(
            db.status(pr.status_id).await.unwrap().status,
            StatusValue::MERGED
        );
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let db = MemoryDatabase::new();
        let mut scope = db.begin().await.unwrap();

        let err = MemoryPullRequestRepository::new(SystemClock)
            .get_pull_request_by_id(&mut scope, PullRequestId::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = MemoryStatusRepository
            .update_status_by_id(&mut scope, StatusId::new(), StatusValue::MERGED)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn unassigned_pull_request_has_no_reviewers() {
        let db = MemoryDatabase::new();
        let mut scope = db.begin().await.unwrap();
        let reviewers = MemoryReviewerRepository
            .get_reviewers_by_pull_request_id(&mut scope, PullRequestId::new())
            .await
            .unwrap();
        assert!(reviewers.is_empty());
    }

    #[tokio::test]
    async fn duplicate_inserts_conflict() {
        let db = MemoryDatabase::new();
        let pr = pull_request();
        let reviewer = UserId::new();
        db.seed(pr.clone(), StatusValue::OPEN, &[reviewer])
            .await
            .unwrap();

        let err = db
            .seed(pr.clone(), StatusValue::OPEN, &[])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let mut scope = db.begin().await.unwrap();
        let err = MemoryReviewerRepository
            .save_reviewer(&mut scope, &ReviewerAssignment::new(pr.id, reviewer))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn failed_seed_leaves_nothing_behind() {
        let db = MemoryDatabase::new();
        let pr = pull_request();
        let reviewer = UserId::new();

        // The repeated reviewer makes the third insert fail after the first two succeed.
        let err = db
            .seed(pr.clone(), StatusValue::OPEN, &[reviewer, reviewer])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(db.pull_request(pr.id).await.is_none());
        assert!(db.status(pr.status_id).await.is_none());
    }
}
