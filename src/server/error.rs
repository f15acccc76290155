//! Error-to-response mapping for the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::reconcile::ReconcileError;
use crate::scoring::ScoringError;

/// Application-level error type for handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    /// The event stream did not cover the sentence. Surfaced with the fixed
    /// message clients key off.
    #[error("unprocessable data")]
    Unprocessable,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal server error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unprocessable => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Unprocessable data".to_string(),
            ),
            AppError::Database(e) => {
                error!(error = %e, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

impl From<ReconcileError> for AppError {
    fn from(e: ReconcileError) -> Self {
        match e {
            ReconcileError::IncompleteInput => AppError::Unprocessable,
        }
    }
}

impl From<ScoringError> for AppError {
    fn from(e: ScoringError) -> Self {
        // A degenerate zero-length sentence violates corpus invariants; it
        // is an internal fault, never the client's.
        AppError::Internal(e.to_string())
    }
}
