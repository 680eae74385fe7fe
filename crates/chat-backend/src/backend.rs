//! ChatBackend implementation over the chat-completions API.

use backend_core::{async_trait, BackendError, DayRequest, GenerationBackend};
use reqwest::Client;
use tracing::{debug, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::ChatBackendConfig;

/// A generation backend using a stateless chat-completions API.
///
/// Each day request is a single bounded-timeout HTTP call. Prior exchanges
/// are carried inside the request body, so no channel state survives between
/// calls and `connect`/`disconnect` are no-ops.
pub struct ChatBackend {
    client: Client,
    config: ChatBackendConfig,
}

impl ChatBackend {
    /// Create a new ChatBackend with the given configuration.
    pub fn new(config: ChatBackendConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| {
                BackendError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Create a ChatBackend from environment variables.
    ///
    /// See [`ChatBackendConfig::from_env`] for the variable list.
    pub fn from_env() -> Result<Self, BackendError> {
        let config = ChatBackendConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChatBackendConfig {
        &self.config
    }

    /// Build the messages array: system prompt, trailing context, day prompt.
    fn build_messages(&self, request: &DayRequest) -> Vec<ChatMessage> {
        let mut messages = vec![ChatMessage::system(self.config.system_prompt.clone())];

        let context = &request.context;
        let start = context.len().saturating_sub(self.config.context_messages);
        for msg in &context[start..] {
            messages.push(ChatMessage {
                role: msg.role.clone(),
                content: msg.content.clone(),
            });
        }

        messages.push(ChatMessage::user(request.prompt.clone()));
        messages
    }
}

#[async_trait]
impl GenerationBackend for ChatBackend {
    async fn generate_day(&self, request: &DayRequest) -> Result<String, BackendError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);
        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: self.build_messages(request),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(day = request.day, model = %body.model, "Sending chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout
                } else {
                    BackendError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(BackendError::GenerationFailed(format!(
                    "API error ({}): {}",
                    status.as_u16(),
                    api_error.error.message
                )));
            }

            return Err(BackendError::GenerationFailed(format!(
                "API error ({}): {}",
                status.as_u16(),
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            BackendError::GenerationFailed(format!("Failed to parse response: {}", e))
        })?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .map(|s| s.trim().to_string())
            .ok_or_else(|| {
                warn!(day = request.day, "No content in chat completion response");
                BackendError::GenerationFailed("no content in response".to_string())
            })
    }

    fn name(&self) -> &str {
        "ChatBackend"
    }
}
