//! Configuration for RealtimeBackend.

use std::env;
use std::time::Duration;

use backend_core::BackendError;

/// Configuration for RealtimeBackend.
#[derive(Debug, Clone)]
pub struct RealtimeBackendConfig {
    /// WebSocket endpoint URL.
    pub ws_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Timeout for establishing the channel.
    pub connect_timeout: Duration,

    /// Timeout for one day response.
    pub response_timeout: Duration,
}

impl Default for RealtimeBackendConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://api.openai.com/v1/realtime".to_string(),
            api_key: String::new(),
            model: "gpt-4".to_string(),
            connect_timeout: Duration::from_secs(10),
            response_timeout: Duration::from_secs(120),
        }
    }
}

impl RealtimeBackendConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `REALTIME_AI_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `REALTIME_AI_WS_URL` - WebSocket URL (default: wss://api.openai.com/v1/realtime)
    /// - `REALTIME_AI_MODEL` - Model name (default: gpt-4)
    /// - `REALTIME_AI_CONNECT_TIMEOUT_SECS` - Connect timeout (default: 10)
    /// - `REALTIME_AI_RESPONSE_TIMEOUT_SECS` - Response timeout (default: 120)
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = env::var("REALTIME_AI_API_KEY")
            .map_err(|_| BackendError::Configuration("REALTIME_AI_API_KEY not set".to_string()))?;

        let defaults = Self::default();

        let ws_url = env::var("REALTIME_AI_WS_URL").unwrap_or(defaults.ws_url);
        let model = env::var("REALTIME_AI_MODEL").unwrap_or(defaults.model);

        let connect_timeout = env::var("REALTIME_AI_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.connect_timeout);

        let response_timeout = env::var("REALTIME_AI_RESPONSE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.response_timeout);

        Ok(Self {
            ws_url,
            api_key,
            model,
            connect_timeout,
            response_timeout,
        })
    }

    /// Create a builder for test and programmatic construction.
    pub fn builder() -> RealtimeBackendConfigBuilder {
        RealtimeBackendConfigBuilder::default()
    }
}

/// Builder for [`RealtimeBackendConfig`].
#[derive(Debug, Default)]
pub struct RealtimeBackendConfigBuilder {
    config: Option<RealtimeBackendConfig>,
}

impl RealtimeBackendConfigBuilder {
    fn config(&mut self) -> &mut RealtimeBackendConfig {
        self.config
            .get_or_insert_with(RealtimeBackendConfig::default)
    }

    /// Set the WebSocket URL.
    pub fn ws_url(mut self, url: impl Into<String>) -> Self {
        self.config().ws_url = url.into();
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

    /// Set the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config().connect_timeout = timeout;
        self
    }

    /// Set the response timeout.
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.config().response_timeout = timeout;
        self
    }

    /// Finish building.
    pub fn build(mut self) -> RealtimeBackendConfig {
        self.config.take().unwrap_or_default()
    }
}
