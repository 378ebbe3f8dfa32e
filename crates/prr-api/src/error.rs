//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps merge failures to HTTP status codes through
//! [`prr_merge::MergeError::kind`], never through individual variants.
//! Internal error details are logged, not returned.
//!
//! A body that parses but fails validation answers 422 with the same
//! `BAD_REQUEST` code as a body that does not parse.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use prr_merge::{CreateError, ErrorKind, MergeError, ReadTarget, WriteTarget};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BAD_REQUEST").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The pull request to create already exists (400).
    #[error("{0}")]
    AlreadyExists(String),

    /// Internal server error (500). Only `public` reaches the client.
    #[error("internal error: {detail}")]
    Internal {
        /// Message returned to the client.
        public: &'static str,
        /// Message written to the log.
        detail: String,
    },
}

const GENERIC_INTERNAL: &str = "An internal error occurred";

impl AppError {
    /// Internal error with the generic public message.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            public: GENERIC_INTERNAL,
            detail: detail.into(),
        }
    }

    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::AlreadyExists(_) => (StatusCode::BAD_REQUEST, "PR_EXISTS"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal { public, .. } => {
                tracing::error!(error = %self, "internal server error");
                (*public).to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert merge failures to API errors.
impl From<MergeError> for AppError {
    fn from(err: MergeError) -> Self {
        let public = match err.kind() {
            ErrorKind::NotFound => return Self::NotFound(err.to_string()),
            ErrorKind::ReadFailure(ReadTarget::PullRequest) => {
                "error occurred while getting pull request"
            }
            ErrorKind::ReadFailure(ReadTarget::Status) => "error occurred while getting pr status",
            ErrorKind::ReadFailure(ReadTarget::Reviewers) => {
                "error occurred while getting pr reviewers"
            }
            ErrorKind::WriteFailure(WriteTarget::Status) => "error occurred while setting pr status",
            ErrorKind::WriteFailure(WriteTarget::MergeTime) => {
                "error occurred while updating pr merge time"
            }
            ErrorKind::Unclassified => GENERIC_INTERNAL,
        };
        Self::Internal {
            public,
            detail: err.to_string(),
        }
    }
}

/// Convert creation failures to API errors.
impl From<CreateError> for AppError {
    fn from(err: CreateError) -> Self {
        let public = match &err {
            CreateError::AlreadyExists { .. } => {
                return Self::AlreadyExists("pull request already exists".to_string())
            }
            CreateError::GetPullRequest { .. } => {
                "error occurred while checking pull request existence"
            }
            CreateError::SaveStatus { .. } => "error occurred while setting PR status",
            CreateError::SavePullRequest { .. } => "error occurred while saving pull request in db",
            CreateError::AssignReviewer { .. } => "error occurred while assigning reviewers",
            CreateError::Transaction { .. } => GENERIC_INTERNAL,
        };
        Self::Internal {
            public,
            detail: err.to_string(),
        }
    }
}
