//! Error types for the mobile API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use database::{DatabaseError, ValidationError};
use orchestrator::OrchestratorError;

/// Errors that can occur while serving API requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request payload; no session is created.
    #[error("Validation error")]
    Validation(#[from] ValidationError),

    /// Database failure.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Generation engine failure.
    #[error("Generation error: {0}")]
    Orchestrator(#[from] OrchestratorError),

    /// Referenced resource does not exist.
    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match &self {
            ApiError::Validation(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Validation error".to_string(),
                Some(err.to_string()),
            ),
            ApiError::Database(DatabaseError::NotFound { entity, id }) => (
                StatusCode::NOT_FOUND,
                format!("{} not found: {}", entity, id),
                None,
            ),
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
            ApiError::Orchestrator(err) => {
                tracing::error!("Generation error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to start meal generation".to_string(),
                    None,
                )
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone(), None),
        };

        let body = serde_json::json!({
            "success": false,
            "message": message,
            "errors": errors,
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
