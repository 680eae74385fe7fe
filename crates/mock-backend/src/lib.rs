//! Mock generation backends for orchestrator testing.
//!
//! This crate provides mock implementations of the `GenerationBackend` trait:
//! - `ScriptedBackend` - Replays a queue of canned responses and errors
//! - `FailingBackend` - Always fails with a chosen error
//! - `DelayedBackend` - Wraps another backend with artificial latency
//!
//! For production generation, use the `chat-backend` or `realtime-backend`
//! crates instead.
//!
//! # Example
//!
//! ```rust
//! use mock_backend::{DayRequest, GenerationBackend, ScriptedBackend};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_backend::BackendError> {
//!     let backend = ScriptedBackend::new();
//!     backend.push_response(r#"{"day": 1, "meals": []}"#);
//!
//!     let request = DayRequest::new(1, "Nutritionist Day 1");
//!     let response = backend.generate_day(&request).await?;
//!     println!("Response: {}", response);
//!     Ok(())
//! }
//! ```

mod delayed;
mod failing;
mod scripted;

// Re-export backend-core types for convenience
pub use backend_core::{
    async_trait, BackendError, ConversationWindow, DayRequest, GenerationBackend, WindowMessage,
};

pub use delayed::DelayedBackend;
pub use failing::{FailingBackend, FailureMode};
pub use scripted::ScriptedBackend;
