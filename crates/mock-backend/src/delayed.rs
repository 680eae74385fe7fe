//! Delayed backend - wraps another backend with artificial delay.

use std::time::Duration;

use backend_core::{async_trait, BackendError, DayRequest, GenerationBackend};
use tokio::time::sleep;

/// A backend that wraps another backend and adds artificial delay.
///
/// Useful for testing timeout handling and simulating generation latency.
pub struct DelayedBackend<B: GenerationBackend> {
    inner: B,
    delay: Duration,
}

impl<B: GenerationBackend> DelayedBackend<B> {
    /// Create a new DelayedBackend wrapping the given backend.
    pub fn new(inner: B, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Create a backend with a delay in milliseconds.
    pub fn with_millis(inner: B, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }

    /// Create a backend with a delay in seconds.
    pub fn with_secs(inner: B, secs: u64) -> Self {
        Self::new(inner, Duration::from_secs(secs))
    }
}

#[async_trait]
impl<B: GenerationBackend> GenerationBackend for DelayedBackend<B> {
    async fn connect(&self) -> bool {
        self.inner.connect().await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    async fn generate_day(&self, request: &DayRequest) -> Result<String, BackendError> {
        sleep(self.delay).await;
        self.inner.generate_day(request).await
    }

    async fn disconnect(&self) {
        self.inner.disconnect().await;
    }

    fn name(&self) -> &str {
        "DelayedBackend"
    }
}
