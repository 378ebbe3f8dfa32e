//! # Creation Tests
//!
//! Drives [`CreateWorkflow`] against the in-memory backend and hands the
//! result to the merge workflow.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use prr_core::{
    FixedClock, PullRequest, PullRequestId, ReviewerAssignment, StatusValue, UserId,
};
use prr_merge::memory::{
    MemoryDatabase, MemoryPullRequestRepository, MemoryReviewerRepository, MemoryScope,
    MemoryStatusRepository,
};
use prr_merge::{
    CreateError, CreatePullRequest, CreateWorkflow, Entity, MergeOutcome, NewPullRequest,
    PullRequestRepository, ReviewerRepository, StoreError,
};

fn created_time() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::new(created_time())
}

fn new_pull_request(reviewers: Vec<UserId>) -> NewPullRequest {
    NewPullRequest {
        id: PullRequestId::new(),
        name: "Add create endpoint".into(),
        author_id: UserId::new(),
        reviewers,
    }
}

#[tokio::test]
async fn created_pull_request_is_open_and_mergeable() {
    let db = MemoryDatabase::new();
    let reviewers = vec![UserId::new(), UserId::new()];
    let new = new_pull_request(reviewers.clone());

    let created = db.create_workflow(clock()).create(new.clone()).await.unwrap();

    assert_eq!(created.pull_request_id, new.id);
    assert_eq!(created.status, StatusValue::OPEN);
    assert_eq!(created.created_at, created_time());
    assert!(created.merged_at.is_none());
    assert_eq!(
        created.assigned_reviewers,
        reviewers.iter().copied().collect()
    );

    let outcome = db.merge_workflow(clock()).merge(new.id).await.unwrap();
    assert!(matches!(outcome, MergeOutcome::Merged(_)));
    assert_eq!(outcome.result().assigned_reviewers, created.assigned_reviewers);
}

#[tokio::test]
async fn author_is_never_assigned() {
    let db = MemoryDatabase::new();
    let reviewer = UserId::new();
    let mut new = new_pull_request(vec![reviewer]);
    new.reviewers.push(new.author_id);

    let created = db.create_workflow(clock()).create(new.clone()).await.unwrap();

    assert_eq!(created.assigned_reviewers.len(), 1);
    assert!(!created.assigned_reviewers.contains(&new.author_id));
}

#[tokio::test]
async fn duplicate_identifier_is_rejected_without_writes() {
    let db = MemoryDatabase::new();
    let workflow = db.create_workflow(clock());
    let new = new_pull_request(vec![]);
    let first = workflow.create(new.clone()).await.unwrap();

    let mut again = new.clone();
    again.name = "Different title".into();
    let err = workflow.create(again).await.unwrap_err();

    assert_eq!(err, CreateError::AlreadyExists { id: new.id });
    let stored = db.pull_request(new.id).await.unwrap();
    assert_eq!(stored.name, first.pull_request_name);
}

#[tokio::test]
async fn trait_object_entry_point_creates() {
    let db = MemoryDatabase::new();
    let entry: std::sync::Arc<dyn CreatePullRequest> =
        std::sync::Arc::new(db.create_workflow(clock()));
    let new = new_pull_request(vec![UserId::new()]);

    entry.create_pull_request(new.clone()).await.unwrap();

    assert!(db.pull_request(new.id).await.is_some());
}

// -- Failure injection ----------------------------------------------------------

/// Fails every reviewer assignment.
struct FailingAssignments;

#[async_trait]
impl ReviewerRepository<MemoryScope> for FailingAssignments {
    async fn get_reviewers_by_pull_request_id(
        &self,
        scope: &mut MemoryScope,
        id: PullRequestId,
    ) -> Result<Vec<ReviewerAssignment>, StoreError> {
        MemoryReviewerRepository
            .get_reviewers_by_pull_request_id(scope, id)
            .await
    }

    async fn save_reviewer(
        &self,
        _scope: &mut MemoryScope,
        _assignment: &ReviewerAssignment,
    ) -> Result<ReviewerAssignment, StoreError> {
        Err(StoreError::Backend("disk full".into()))
    }
}

#[tokio::test]
async fn failed_assignment_rolls_back_the_whole_creation() {
    let db = MemoryDatabase::new();
    let reviewer = UserId::new();
    let new = new_pull_request(vec![reviewer]);
    let workflow = CreateWorkflow::new(
        db.clone(),
        MemoryPullRequestRepository::new(clock()),
        MemoryStatusRepository,
        FailingAssignments,
        clock(),
    );

    let err = workflow.create(new.clone()).await.unwrap_err();

    assert!(matches!(
        err,
        CreateError::AssignReviewer { reviewer_id, .. } if reviewer_id == reviewer
    ));
    assert!(db.pull_request(new.id).await.is_none());

    // Nothing half-created blocks a retry.
    db.create_workflow(clock()).create(new.clone()).await.unwrap();
    assert!(db.pull_request(new.id).await.is_some());
}

/// Reports the pull request as absent, then loses the insert race.
struct LosingInsert;

#[async_trait]
impl PullRequestRepository<MemoryScope> for LosingInsert {
    async fn get_pull_request_by_id(
        &self,
        _scope: &mut MemoryScope,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError> {
        Err(StoreError::not_found(Entity::PullRequest, id))
    }

    async fn mark_pull_request_merged_by_id(
        &self,
        scope: &mut MemoryScope,
        id: PullRequestId,
    ) -> Result<PullRequest, StoreError> {
        MemoryPullRequestRepository::new(clock())
            .mark_pull_request_merged_by_id(scope, id)
            .await
    }

    async fn save_pull_request(
        &self,
        _scope: &mut MemoryScope,
        pull_request: &PullRequest,
    ) -> Result<PullRequest, StoreError> {
        Err(StoreError::Conflict(format!(
            "duplicate key value violates unique constraint on {}",
            pull_request.id
        )))
    }
}

#[tokio::test]
async fn insert_conflict_is_reported_as_already_exists() {
    let db = MemoryDatabase::new();
    let new = new_pull_request(vec![]);
    let workflow = CreateWorkflow::new(
        db.clone(),
        LosingInsert,
        MemoryStatusRepository,
        MemoryReviewerRepository,
        clock(),
    );

    let err = workflow.create(new.clone()).await.unwrap_err();

    assert_eq!(err, CreateError::AlreadyExists { id: new.id });
}

#[tokio::test]
async fn store_read_failure_is_not_already_exists() {
    struct BrokenReads;

    #[async_trait]
    impl PullRequestRepository<MemoryScope> for BrokenReads {
        async fn get_pull_request_by_id(
            &self,
            _scope: &mut MemoryScope,
            _id: PullRequestId,
        ) -> Result<PullRequest, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }

        async fn mark_pull_request_merged_by_id(
            &self,
            _scope: &mut MemoryScope,
            _id: PullRequestId,
        ) -> Result<PullRequest, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }

        async fn save_pull_request(
            &self,
            _scope: &mut MemoryScope,
            _pull_request: &PullRequest,
        ) -> Result<PullRequest, StoreError> {
            Err(StoreError::Backend("connection reset".into()))
        }
    }

    let db = MemoryDatabase::new();
    let new = new_pull_request(vec![]);
    let workflow = CreateWorkflow::new(
        db.clone(),
        BrokenReads,
        MemoryStatusRepository,
        MemoryReviewerRepository,
        clock(),
    );

    let err = workflow.create(new.clone()).await.unwrap_err();

    assert!(matches!(err, CreateError::GetPullRequest { id, .. } if id == new.id));
}
