//! Core trait and types for generation backend transports.
//!
//! This crate provides the shared interface over the two interchangeable
//! transports that drive meal plan generation:
//!
//! - [`GenerationBackend`] - The trait both transports implement
//! - [`DayRequest`] - One day's generation request (prompt + trailing context)
//! - [`ConversationWindow`] - Bounded trailing window of prior exchanges
//! - [`BackendError`] - Error types for transport operations
//!
//! # Example
//!
//! ```rust
//! use backend_core::{BackendError, DayRequest, GenerationBackend};
//! use async_trait::async_trait;
//!
//! struct MyBackend;
//!
//! #[async_trait]
//! impl GenerationBackend for MyBackend {
//!     async fn generate_day(&self, request: &DayRequest) -> Result<String, BackendError> {
//!         Ok(format!("{{\"day\": {}, \"meals\": []}}", request.day))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "MyBackend"
//!     }
//! }
//! ```

mod error;
mod message;
mod trait_def;
mod window;

pub use error::BackendError;
pub use message::{DayRequest, WindowMessage};
pub use trait_def::GenerationBackend;
pub use window::ConversationWindow;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
