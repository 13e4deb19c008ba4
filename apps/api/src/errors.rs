use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failures of the interview core.
///
/// Evaluation and report problems never appear here: they degrade to placeholder
/// results inside the orchestrator and the interview continues.
#[derive(Debug, Error)]
pub enum InterviewError {
    /// An id that is not in the task catalog. Indicates a defect, not user error.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// A non-resting stage expected data the state does not carry.
    #[error("Inconsistent interview state: {0}")]
    InconsistentState(String),

    #[error("Dataset I/O error: {0}")]
    Dataset(#[from] std::io::Error),
}

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Another call on the same interview is still running.
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Interview error: {0}")]
    Interview(#[from] InterviewError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Busy(msg) => (StatusCode::CONFLICT, "INTERVIEW_BUSY", msg.clone()),
            AppError::Interview(e) => {
                tracing::error!("Interview error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERVIEW_ERROR",
                    "The interview could not advance".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
