//! Failing backend - always errors with a chosen failure mode.

use async_trait::async_trait;

use backend_core::{BackendError, DayRequest, GenerationBackend};

/// How the backend should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureMode {
    /// Fail with a network error.
    Network(String),
    /// Fail with a timeout.
    Timeout,
    /// Fail with a generation error.
    Generation(String),
}

impl FailureMode {
    fn to_error(&self) -> BackendError {
        match self {
            FailureMode::Network(msg) => BackendError::Network(msg.clone()),
            FailureMode::Timeout => BackendError::Timeout,
            FailureMode::Generation(msg) => BackendError::GenerationFailed(msg.clone()),
        }
    }
}

/// A backend whose every generation attempt fails.
///
/// Useful for exercising fallback and abort policies.
#[derive(Debug, Clone)]
pub struct FailingBackend {
    mode: FailureMode,
}

impl FailingBackend {
    /// Create a backend that fails with the given mode.
    pub fn new(mode: FailureMode) -> Self {
        Self { mode }
    }

    /// Create a backend that fails with a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureMode::Network(message.into()))
    }

    /// Create a backend that times out.
    pub fn timeout() -> Self {
        Self::new(FailureMode::Timeout)
    }
}

#[async_trait]
impl GenerationBackend for FailingBackend {
    async fn generate_day(&self, _request: &DayRequest) -> Result<String, BackendError> {
        Err(self.mode.to_error())
    }

    fn name(&self) -> &str {
        "FailingBackend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_network_failure() {
        let backend = FailingBackend::network("connection refused");
        let request = DayRequest::new(1, "prompt");

        let err = backend.generate_day(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::Network(_)));
    }

    #[tokio::test]
    async fn test_timeout_failure() {
        let backend = FailingBackend::timeout();
        let request = DayRequest::new(1, "prompt");

        let err = backend.generate_day(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout));
    }
}
