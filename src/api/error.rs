/// API errors and their `{ "detail": ... }` rendering
///
/// Storage, upstream and extractor failures all funnel into `ApiError`.

use crate::projects_service::UpstreamError;
use crate::roster::StorageError;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// No row for the given id or pair
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation
    #[error("{0}")]
    Conflict(String),

    /// Projects service unreachable or non-2xx
    #[error("failed to notify projects service: {0}")]
    Upstream(#[from] UpstreamError),

    /// Storage failure; details stay in the logs
    #[error("internal error")]
    Internal,
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::CollaboratorNotFound(_) => ApiError::NotFound(err.to_string()),
            StorageError::EmailTaken(_)
            | StorageError::AlreadyEnrolled { .. }
            | StorageError::DuplicateSkill(_) => ApiError::Conflict(err.to_string()),
            StorageError::LevelRejected => ApiError::Validation(err.to_string()),
            StorageError::Database(e) => {
                tracing::error!("❌ Storage failure: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            detail: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_taxonomy() {
        assert_eq!(
            ApiError::from(StorageError::EmailTaken("a@x.com".to_string())).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StorageError::AlreadyEnrolled {
                collaborator_id: 1,
                project_id: 42
            })
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StorageError::CollaboratorNotFound(3)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StorageError::LevelRejected).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn database_errors_do_not_leak_driver_text() {
        let err = ApiError::from(StorageError::Database(sqlx::Error::RowNotFound));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "internal error");
    }

    #[test]
    fn upstream_failure_is_server_error() {
        let err = ApiError::from(UpstreamError::Status(503));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("503"));
    }
}
