//! Error types for backend transport operations.

use thiserror::Error;

/// Errors that can occur while talking to a generation backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend configuration is invalid or incomplete.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The transport could not reach the backend.
    #[error("network error: {0}")]
    Network(String),

    /// The backend accepted the request but failed to produce output.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The transport is not connected.
    #[error("backend not connected")]
    NotConnected,

    /// The request timed out.
    #[error("generation timed out")]
    Timeout,
}
