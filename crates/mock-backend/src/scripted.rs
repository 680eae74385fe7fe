//! Scripted backend - replays a queue of canned outcomes.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use backend_core::{BackendError, DayRequest, GenerationBackend};

/// A backend that replays queued responses and errors in order.
///
/// Also counts connect/disconnect calls so tests can assert the channel is
/// released on every orchestrator exit path.
#[derive(Debug)]
pub struct ScriptedBackend {
    outcomes: Mutex<VecDeque<Result<String, BackendError>>>,
    connectable: bool,
    connected: AtomicBool,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl ScriptedBackend {
    /// Create an empty scripted backend that accepts connections.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            connectable: true,
            connected: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        }
    }

    /// Create a scripted backend whose `connect()` always fails.
    pub fn unconnectable() -> Self {
        Self {
            connectable: false,
            ..Self::new()
        }
    }

    /// Queue a successful response.
    pub fn push_response(&self, text: impl Into<String>) {
        self.outcomes
            .lock()
            .expect("outcome queue poisoned")
            .push_back(Ok(text.into()));
    }

    /// Queue `count` copies of the same successful response.
    pub fn push_responses(&self, text: impl Into<String>, count: usize) {
        let text = text.into();
        let mut outcomes = self.outcomes.lock().expect("outcome queue poisoned");
        for _ in 0..count {
            outcomes.push_back(Ok(text.clone()));
        }
    }

    /// Queue an error outcome.
    pub fn push_error(&self, error: BackendError) {
        self.outcomes
            .lock()
            .expect("outcome queue poisoned")
            .push_back(Err(error));
    }

    /// Number of outcomes still queued.
    pub fn remaining(&self) -> usize {
        self.outcomes.lock().expect("outcome queue poisoned").len()
    }

    /// Number of times `connect` was called.
    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    /// Number of times `disconnect` was called.
    pub fn disconnect_calls(&self) -> usize {
        self.disconnect_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn connect(&self) -> bool {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if self.connectable {
            self.connected.store(true, Ordering::SeqCst);
        }
        self.connectable
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn generate_day(&self, _request: &DayRequest) -> Result<String, BackendError> {
        self.outcomes
            .lock()
            .expect("outcome queue poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(BackendError::GenerationFailed(
                    "script exhausted".to_string(),
                ))
            })
    }

    async fn disconnect(&self) {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.connected.store(false, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "ScriptedBackend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order() {
        let backend = ScriptedBackend::new();
        backend.push_response("first");
        backend.push_response("second");

        let request = DayRequest::new(1, "prompt");
        assert_eq!(backend.generate_day(&request).await.unwrap(), "first");
        assert_eq!(backend.generate_day(&request).await.unwrap(), "second");
        assert_eq!(backend.remaining(), 0);
    }

    #[tokio::test]
    async fn test_error_outcome() {
        let backend = ScriptedBackend::new();
        backend.push_error(BackendError::Timeout);

        let request = DayRequest::new(1, "prompt");
        let err = backend.generate_day(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout));
    }

    #[tokio::test]
    async fn test_exhausted_script_fails() {
        let backend = ScriptedBackend::new();
        let request = DayRequest::new(1, "prompt");

        let err = backend.generate_day(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn test_connect_disconnect_tracking() {
        let backend = ScriptedBackend::new();

        assert!(backend.connect().await);
        assert!(backend.is_connected());

        backend.disconnect().await;
        assert!(!backend.is_connected());
        assert_eq!(backend.connect_calls(), 1);
        assert_eq!(backend.disconnect_calls(), 1);
    }

    #[tokio::test]
    async fn test_unconnectable() {
        let backend = ScriptedBackend::unconnectable();

        assert!(!backend.connect().await);
        assert!(!backend.is_connected());
    }
}
