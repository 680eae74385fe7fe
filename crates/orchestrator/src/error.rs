//! Error types for the generation engine.

use backend_core::BackendError;
use database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while driving a generation run.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Backend transport failure (both transports, for the day in question).
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// Backend responded but the content is not a well-formed day plan.
    #[error("parse error: {0}")]
    Parse(String),

    /// An early-day failure aborted the whole run.
    #[error("run aborted at day {day}: {message}")]
    EarlyAbort { day: u32, message: String },

    /// Session store failure.
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Referenced session does not exist.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The dispatch layer could not hand the job off.
    #[error("dispatch failed: {0}")]
    Dispatch(String),
}
