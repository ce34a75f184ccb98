//! Route error type and its HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use sitecheck_core::domain::JobError;

/// Error body shared by every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Errors a route handler can answer with.
///
/// Status mapping:
/// * `InvalidId` - 400 Bad Request
/// * `Forbidden` - 403 Forbidden
/// * `NotFound` - 404 Not Found
/// * `Conflict` - 409 Conflict
/// * `Internal` - 500 Internal Server Error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid job id: {0}")]
    InvalidId(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(_) => ApiError::NotFound(err.to_string()),
            JobError::InvalidCode => {
                ApiError::Forbidden("Invalid QR code for this location.".to_string())
            }
            JobError::AlreadyCheckedIn(_)
            | JobError::NotCheckedIn(_)
            | JobError::AlreadyCompleted(_) => ApiError::Conflict(err.to_string()),
            JobError::Store(store) => ApiError::Internal(store.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // Store detail stays in the logs; the worker just retries.
            ApiError::Internal(detail) => {
                error!(detail = %detail, "request failed on a store error");
                "internal error, please retry".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ApiResponse::error(message))).into_response()
    }
}
