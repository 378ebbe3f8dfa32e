//! # Pull Request Routes
//!
//! Mounted under `/api/v1`.
//!
//! - `POST /pullRequest/create` creates an `OPEN` pull request with its
//!   reviewers and answers 201.
//! - `POST /pullRequest/merge` runs the merge workflow for one pull request.
//!   Merging an already merged pull request is not an error: both outcomes
//!   answer 200 with the current state.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use prr_core::{PullRequestId, UserId};
use prr_merge::{MergeOutcome, MergeResult, NewPullRequest};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::middleware::metrics;
use crate::state::AppState;

// -- Request / response types -------------------------------------------------

/// Request to create a pull request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreatePullRequestRequest {
    pub pull_request_id: Uuid,
    pub pull_request_name: String,
    pub author_id: Uuid,
    /// Requested reviewers. The author and duplicates are ignored.
    #[serde(default)]
    pub reviewers: Vec<Uuid>,
}

impl Validate for CreatePullRequestRequest {
    fn validate(&self) -> Result<(), String> {
        if self.pull_request_id.is_nil() {
            return Err("pull_request_id must not be the nil UUID".to_string());
        }
        if self.pull_request_name.trim().is_empty() {
            return Err("pull_request_name must not be empty".to_string());
        }
        if self.author_id.is_nil() {
            return Err("author_id must not be the nil UUID".to_string());
        }
        if self.reviewers.iter().any(Uuid::is_nil) {
            return Err("reviewers must not contain the nil UUID".to_string());
        }
        Ok(())
    }
}

impl From<CreatePullRequestRequest> for NewPullRequest {
    fn from(req: CreatePullRequestRequest) -> Self {
        Self {
            id: PullRequestId::from_uuid(req.pull_request_id),
            name: req.pull_request_name,
            author_id: UserId::from_uuid(req.author_id),
            reviewers: req.reviewers.into_iter().map(UserId::from_uuid).collect(),
        }
    }
}

/// Request to merge a pull request.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct MergePullRequestRequest {
    pub pull_request_id: Uuid,
}

impl Validate for MergePullRequestRequest {
    fn validate(&self) -> Result<(), String> {
        if self.pull_request_id.is_nil() {
            return Err("pull_request_id must not be the nil UUID".to_string());
        }
        Ok(())
    }
}

/// Pull request state returned by both endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PullRequestView {
    pub pull_request_id: Uuid,
    pub pull_request_name: String,
    pub author_id: Uuid,
    pub status: String,
    /// Sorted by id.
    pub assigned_reviewers: Vec<Uuid>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "mergedAt", default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<DateTime<Utc>>,
}

impl From<MergeResult> for PullRequestView {
    fn from(result: MergeResult) -> Self {
        Self {
            pull_request_id: *result.pull_request_id.as_uuid(),
            pull_request_name: result.pull_request_name,
            author_id: *result.author_id.as_uuid(),
            status: result.status.to_string(),
            assigned_reviewers: result
                .assigned_reviewers
                .iter()
                .map(|reviewer| *reviewer.as_uuid())
                .collect(),
            created_at: result.created_at,
            merged_at: result.merged_at,
        }
    }
}

/// Response envelope for the create endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatePullRequestResponse {
    pub pr: PullRequestView,
}

/// Response envelope for the merge endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MergePullRequestResponse {
    pub pr: PullRequestView,
}

// -- Router -------------------------------------------------------------------

/// Build the pull request router. Paths are relative to `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pullRequest/create", post(create_pull_request))
        .route("/pullRequest/merge", post(merge_pull_request))
}

// -- Handlers -----------------------------------------------------------------

/// POST /api/v1/pullRequest/create
#[utoipa::path(
    post,
    path = "/api/v1/pullRequest/create",
    request_body = CreatePullRequestRequest,
    responses(
        (status = 201, description = "Pull request created", body = CreatePullRequestResponse),
        (status = 400, description = "Malformed request body, or the pull request already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Request failed validation", body = crate::error::ErrorBody),
        (status = 500, description = "Store failure, nothing was persisted", body = crate::error::ErrorBody),
    ),
    tag = "pull-requests"
)]
pub async fn create_pull_request(
    State(state): State<AppState>,
    body: Result<Json<CreatePullRequestRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePullRequestResponse>), AppError> {
    let req = extract_validated_json(body)?;

    let created = state.create.create_pull_request(req.into()).await?;
    metrics::pull_request_created();
    tracing::info!(
        pull_request_id = %created.pull_request_id,
        reviewers = created.assigned_reviewers.len(),
        "pull request created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreatePullRequestResponse { pr: created.into() }),
    ))
}

/// POST /api/v1/pullRequest/merge
#[utoipa::path(
    post,
    path = "/api/v1/pullRequest/merge",
    request_body = MergePullRequestRequest,
    responses(
        (status = 200, description = "Pull request merged, or already merged", body = MergePullRequestResponse),
        (status = 400, description = "Malformed request body", body = crate::error::ErrorBody),
        (status = 404, description = "Pull request not found", body = crate::error::ErrorBody),
        (status = 422, description = "Invalid pull request id", body = crate::error::ErrorBody),
        (status = 500, description = "Store failure, nothing was persisted", body = crate::error::ErrorBody),
    ),
    tag = "pull-requests"
)]
pub async fn merge_pull_request(
    State(state): State<AppState>,
    body: Result<Json<MergePullRequestRequest>, JsonRejection>,
) -> Result<Json<MergePullRequestResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let id = PullRequestId::from_uuid(req.pull_request_id);

    let outcome = state.merge.merge_pull_request(id).await?;
    match &outcome {
        MergeOutcome::Merged(_) => metrics::pull_request_merged(),
        MergeOutcome::AlreadyMerged(_) => {
            tracing::info!(pull_request_id = %id, "merge requested for an already merged pull request");
        }
    }

    Ok(Json(MergePullRequestResponse {
        pr: outcome.into_result().into(),
    }))
}
