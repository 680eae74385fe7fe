//! ChatBackend: stateless request/response transport for day generation.
//!
//! Each call performs one bounded-timeout chat-completions request carrying a
//! short trailing window of prior exchanges as context. No connection state
//! is held between calls, so this transport is always "connected" and serves
//! as the fallback when the realtime channel is unavailable.

mod api_types;
mod backend;
mod config;

pub use api_types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
pub use backend::ChatBackend;
pub use config::ChatBackendConfig;
