//! Database error types.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Stored JSON column could not be decoded
    #[error("corrupt {column} column for session {id}: {source}")]
    CorruptColumn {
        column: &'static str,
        id: String,
        source: serde_json::Error,
    },

    /// Goal updates are only allowed while the run is on day 1
    #[error("goal locked for session {0}: first day already passed")]
    GoalLocked(String),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
