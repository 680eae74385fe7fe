//! Configuration for ChatBackend.

use std::env;
use std::time::Duration;

use backend_core::BackendError;

/// Default system prompt sent ahead of every day request.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a professional nutritionist. Always respond with valid JSON only.";

/// Configuration for ChatBackend.
#[derive(Debug, Clone)]
pub struct ChatBackendConfig {
    /// Chat API base URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// System prompt prepended to every request.
    pub system_prompt: String,

    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// How many trailing window messages to carry as context (2 exchanges
    /// by default).
    pub context_messages: usize,
}

impl Default for ChatBackendConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_tokens: Some(1500),
            temperature: Some(0.7),
            request_timeout: Duration::from_secs(60),
            context_messages: 4,
        }
    }
}

impl ChatBackendConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `CHAT_AI_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `CHAT_AI_API_URL` - API URL (default: https://api.openai.com)
    /// - `CHAT_AI_MODEL` - Model name (default: gpt-4)
    /// - `CHAT_AI_SYSTEM_PROMPT` - System prompt override
    /// - `CHAT_AI_MAX_TOKENS` - Max tokens (default: 1500)
    /// - `CHAT_AI_TEMPERATURE` - Temperature (default: 0.7)
    /// - `CHAT_AI_TIMEOUT_SECS` - Request timeout (default: 60)
    /// - `CHAT_AI_CONTEXT_MESSAGES` - Trailing context size (default: 4)
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = env::var("CHAT_AI_API_KEY")
            .map_err(|_| BackendError::Configuration("CHAT_AI_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let api_url = env::var("CHAT_AI_API_URL").unwrap_or(defaults.api_url);
        let model = env::var("CHAT_AI_MODEL").unwrap_or(defaults.model);
        let system_prompt = env::var("CHAT_AI_SYSTEM_PROMPT").unwrap_or(defaults.system_prompt);

        let max_tokens = env::var("CHAT_AI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.max_tokens);

        let temperature = env::var("CHAT_AI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.temperature);

        let request_timeout = env::var("CHAT_AI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        let context_messages = env::var("CHAT_AI_CONTEXT_MESSAGES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.context_messages);

        Ok(Self {
            api_url,
            api_key,
            model,
            system_prompt,
            max_tokens,
            temperature,
            request_timeout,
            context_messages,
        })
    }

    /// Create a builder for test and programmatic construction.
    pub fn builder() -> ChatBackendConfigBuilder {
        ChatBackendConfigBuilder::default()
    }
}

/// Builder for [`ChatBackendConfig`].
#[derive(Debug, Default)]
pub struct ChatBackendConfigBuilder {
    config: Option<ChatBackendConfig>,
}

impl ChatBackendConfigBuilder {
    fn config(&mut self) -> &mut ChatBackendConfig {
        self.config.get_or_insert_with(ChatBackendConfig::default)
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config().api_url = url.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config().api_key = key.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config().model = model.into();
        self
    }

    /// Set the trailing context size.
    pub fn context_messages(mut self, count: usize) -> Self {
        self.config().context_messages = count;
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config().request_timeout = timeout;
        self
    }

    /// Finish building.
    pub fn build(mut self) -> ChatBackendConfig {
        self.config.take().unwrap_or_default()
    }
}
