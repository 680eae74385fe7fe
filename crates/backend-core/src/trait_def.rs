//! The GenerationBackend trait definition.

use async_trait::async_trait;

use crate::error::BackendError;
use crate::message::DayRequest;

/// A trait for transports that turn a day prompt into generated text.
///
/// Implementations range from scripted test doubles to a persistent
/// low-latency channel. The trait is object-safe and can be used with
/// `Box<dyn GenerationBackend>`.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Attempt to establish the transport channel.
    ///
    /// Returns `false` on any failure rather than erroring, so callers can
    /// fall back to another transport. Stateless transports are always
    /// considered established.
    async fn connect(&self) -> bool {
        true
    }

    /// Check whether the transport channel is currently established.
    fn is_connected(&self) -> bool {
        true
    }

    /// Generate one day's raw output for the given request.
    async fn generate_day(&self, request: &DayRequest) -> Result<String, BackendError>;

    /// Release the transport channel.
    ///
    /// Idempotent. Stateless transports have nothing to release.
    async fn disconnect(&self) {}

    /// Get a human-readable name for this backend implementation.
    fn name(&self) -> &str;
}
