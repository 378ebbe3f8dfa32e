//! # OpenAPI Specification Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pull Request Merge API",
        version = "0.1.0",
        description = "Transactional pull request merging over PostgreSQL or an in-memory store.",
        license(name = "MIT")
    ),
    paths(
        crate::routes::pull_requests::create_pull_request,
        crate::routes::pull_requests::merge_pull_request,
    ),
    components(schemas(
        crate::routes::pull_requests::CreatePullRequestRequest,
        crate::routes::pull_requests::CreatePullRequestResponse,
        crate::routes::pull_requests::MergePullRequestRequest,
        crate::routes::pull_requests::MergePullRequestResponse,
        crate::routes::pull_requests::PullRequestView,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags((name = "pull-requests", description = "Pull request lifecycle"))
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
