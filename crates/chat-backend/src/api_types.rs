//! Wire types for the chat-completions API.

use serde::{Deserialize, Serialize};

/// A chat message in the completions request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for a chat completion.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model name.
    pub model: String,
    /// Ordered conversation messages.
    pub messages: Vec<ChatMessage>,
    /// Maximum tokens for the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// Response body from a chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    /// Response choices.
    pub choices: Vec<ChatChoice>,
    /// Token usage, if reported.
    pub usage: Option<Usage>,
}

/// A single response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    /// The generated message.
    pub message: ResponseMessage,
}

/// The message inside a response choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    /// Generated content, absent when the model produced nothing.
    pub content: Option<String>,
}

/// Token usage accounting.
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Error envelope returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// Error detail inside the envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_skips_absent_options() {
        let request = ChatCompletionRequest {
            model: "gpt-4".to_string(),
            messages: vec![ChatMessage::user("hello")],
            max_tokens: None,
            temperature: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{\"meals\": []}"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }"#;

        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            response.choices[0].message.content.as_deref(),
            Some("{\"meals\": []}")
        );
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"error": {"message": "rate limited", "type": "rate_limit"}}"#;
        let error: ApiError = serde_json::from_str(body).unwrap();
        assert_eq!(error.error.message, "rate limited");
    }
}
