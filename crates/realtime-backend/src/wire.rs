//! Wire events exchanged over the realtime channel.

use serde::{Deserialize, Serialize};

/// Events sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Open a generation session for a model.
    SessionStart {
        /// Model name to generate with.
        model: String,
    },
    /// Request one day's generation.
    DayRequest {
        /// 1-based day index.
        day: u32,
        /// Rendered prompt text.
        prompt: String,
    },
}

/// Events received from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Session acknowledged.
    SessionStarted,
    /// A completed day response.
    DayResponse {
        /// Day index the response belongs to.
        day: u32,
        /// Generated text.
        text: String,
    },
    /// Server-side failure for the in-flight request.
    Error {
        /// Human-readable failure message.
        message: String,
    },
}
