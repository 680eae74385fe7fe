//! Session status route.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use database::{session, SessionStatus};

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Status response payload.
#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub data: StatusData,
}

/// Queryable mid-run state of a session.
#[derive(Serialize)]
pub struct StatusData {
    pub session_id: String,
    pub status: SessionStatus,
    pub current_day: i64,
    pub total_days: i64,
    pub progress: f64,
    pub error_message: Option<String>,
    pub started_at: String,
    pub completed_at: Option<String>,
}

/// Report a session's current status and progress.
pub async fn session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>> {
    let stored = session::find_session(state.db.pool(), &session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Session not found".to_string()))?;

    Ok(Json(StatusResponse {
        success: true,
        data: StatusData {
            progress: stored.progress(),
            session_id: stored.id,
            status: stored.status,
            current_day: stored.current_day,
            total_days: stored.total_days,
            error_message: stored.error_message,
            started_at: stored.started_at,
            completed_at: stored.completed_at,
        },
    }))
}
