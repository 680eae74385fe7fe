//! Request and context message types shared by all transports.

use serde::{Deserialize, Serialize};

/// A single role-tagged message in the trailing conversation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMessage {
    /// Role: "user" or "assistant"
    pub role: String,
    /// Message content
    pub content: String,
}

impl WindowMessage {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One day's generation request.
///
/// Carries the fully rendered prompt plus the trailing conversation context.
/// Stateless transports embed the context into the outgoing request; the
/// persistent transport already holds the conversation server-side and may
/// ignore it.
#[derive(Debug, Clone)]
pub struct DayRequest {
    /// 1-based day index within the plan.
    pub day: u32,
    /// Rendered prompt for this day.
    pub prompt: String,
    /// Trailing window of prior exchanges, oldest first.
    pub context: Vec<WindowMessage>,
}

impl DayRequest {
    /// Create a request with no trailing context.
    pub fn new(day: u32, prompt: impl Into<String>) -> Self {
        Self {
            day,
            prompt: prompt.into(),
            context: Vec::new(),
        }
    }

    /// Attach trailing context to the request.
    pub fn with_context(mut self, context: Vec<WindowMessage>) -> Self {
        self.context = context;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_message_roles() {
        let user = WindowMessage::user("hello");
        let assistant = WindowMessage::assistant("hi");

        assert_eq!(user.role, "user");
        assert_eq!(assistant.role, "assistant");
    }

    #[test]
    fn test_day_request_with_context() {
        let request = DayRequest::new(3, "prompt")
            .with_context(vec![WindowMessage::user("a"), WindowMessage::assistant("b")]);

        assert_eq!(request.day, 3);
        assert_eq!(request.context.len(), 2);
    }
}
