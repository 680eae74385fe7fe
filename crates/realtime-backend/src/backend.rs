//! RealtimeBackend implementation over a persistent WebSocket session.

use std::sync::atomic::{AtomicBool, Ordering};

use backend_core::{async_trait, BackendError, DayRequest, GenerationBackend};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::{timeout, timeout_at, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::config::RealtimeBackendConfig;
use crate::wire::{ClientEvent, ServerEvent};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A generation backend holding one persistent WebSocket session.
///
/// The session keeps conversation state server-side, so day requests carry
/// only the current prompt. One backend instance serves exactly one
/// generation run; it is constructed per run, never shared between runs.
pub struct RealtimeBackend {
    config: RealtimeBackendConfig,
    stream: Mutex<Option<WsStream>>,
    connected: AtomicBool,
}

impl RealtimeBackend {
    /// Create a new, unconnected RealtimeBackend.
    pub fn new(config: RealtimeBackendConfig) -> Self {
        Self {
            config,
            stream: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Create a RealtimeBackend from environment variables.
    ///
    /// See [`RealtimeBackendConfig::from_env`] for the variable list.
    pub fn from_env() -> Result<Self, BackendError> {
        let config = RealtimeBackendConfig::from_env()?;
        Ok(Self::new(config))
    }

    /// Get the configuration.
    pub fn config(&self) -> &RealtimeBackendConfig {
        &self.config
    }

    /// Drop the channel after a transport fault.
    fn mark_disconnected(&self, guard: &mut Option<WsStream>) {
        *guard = None;
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Open the socket and perform the session handshake.
    async fn establish(&self) -> Result<WsStream, String> {
        let mut request = self
            .config
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(|e| format!("invalid WebSocket URL: {}", e))?;

        let auth = HeaderValue::from_str(&format!("Bearer {}", self.config.api_key))
            .map_err(|e| format!("invalid API key header: {}", e))?;
        request.headers_mut().insert(AUTHORIZATION, auth);

        let (mut stream, _) = timeout(self.config.connect_timeout, connect_async(request))
            .await
            .map_err(|_| "connect timed out".to_string())?
            .map_err(|e| format!("connect failed: {}", e))?;

        let start = ClientEvent::SessionStart {
            model: self.config.model.clone(),
        };
        let payload =
            serde_json::to_string(&start).map_err(|e| format!("encode session start: {}", e))?;
        stream
            .send(Message::Text(payload))
            .await
            .map_err(|e| format!("session start failed: {}", e))?;

        // Wait for the session acknowledgement before reporting success.
        let deadline = Instant::now() + self.config.connect_timeout;
        loop {
            let next = timeout_at(deadline, stream.next())
                .await
                .map_err(|_| "session handshake timed out".to_string())?;

            match next {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(ServerEvent::SessionStarted) => return Ok(stream),
                    Ok(ServerEvent::Error { message }) => {
                        return Err(format!("session rejected: {}", message));
                    }
                    Ok(other) => {
                        debug!("Ignoring event during handshake: {:?}", other);
                    }
                    Err(e) => {
                        warn!("Unparseable handshake event: {}", e);
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    return Err("channel closed during handshake".to_string());
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(format!("handshake failed: {}", e)),
            }
        }
    }
}

#[async_trait]
impl GenerationBackend for RealtimeBackend {
    async fn connect(&self) -> bool {
        let mut guard = self.stream.lock().await;
        if guard.is_some() {
            return true;
        }

        match self.establish().await {
            Ok(stream) => {
                *guard = Some(stream);
                self.connected.store(true, Ordering::SeqCst);
                info!("Connected to realtime channel at {}", self.config.ws_url);
                true
            }
            Err(reason) => {
                warn!("Realtime channel unavailable: {}", reason);
                false
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn generate_day(&self, request: &DayRequest) -> Result<String, BackendError> {
        let mut guard = self.stream.lock().await;
        let stream = guard.as_mut().ok_or(BackendError::NotConnected)?;

        let event = ClientEvent::DayRequest {
            day: request.day,
            prompt: request.prompt.clone(),
        };
        let payload = serde_json::to_string(&event)
            .map_err(|e| BackendError::GenerationFailed(format!("encode request: {}", e)))?;

        if let Err(e) = stream.send(Message::Text(payload)).await {
            self.mark_disconnected(&mut guard);
            return Err(BackendError::Network(format!("send failed: {}", e)));
        }

        let deadline = Instant::now() + self.config.response_timeout;
        loop {
            let Some(stream) = guard.as_mut() else {
                return Err(BackendError::NotConnected);
            };

            let next = match timeout_at(deadline, stream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    // A silent channel is unusable for the rest of the run.
                    self.mark_disconnected(&mut guard);
                    return Err(BackendError::Timeout);
                }
            };

            match next {
                Some(Ok(Message::Text(text))) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(ServerEvent::DayResponse { day, text }) if day == request.day => {
                        return Ok(text);
                    }
                    Ok(ServerEvent::DayResponse { day, .. }) => {
                        warn!(
                            expected = request.day,
                            received = day,
                            "Discarding response for wrong day"
                        );
                    }
                    Ok(ServerEvent::Error { message }) => {
                        return Err(BackendError::GenerationFailed(message));
                    }
                    Ok(ServerEvent::SessionStarted) => {
                        debug!("Ignoring duplicate session acknowledgement");
                    }
                    Err(e) => {
                        warn!("Unparseable server event: {}", e);
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    self.mark_disconnected(&mut guard);
                    return Err(BackendError::Network("channel closed".to_string()));
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    self.mark_disconnected(&mut guard);
                    return Err(BackendError::Network(format!("receive failed: {}", e)));
                }
            }
        }
    }

    async fn disconnect(&self) {
        let mut guard = self.stream.lock().await;
        if let Some(mut stream) = guard.take() {
            if let Err(e) = stream.close(None).await {
                debug!("Error closing realtime channel: {}", e);
            }
            info!("Realtime channel released");
        }
        self.connected.store(false, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "RealtimeBackend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_backend() -> RealtimeBackend {
        let config = RealtimeBackendConfig::builder()
            .api_key("test-key")
            .ws_url("ws://127.0.0.1:1")
            .connect_timeout(Duration::from_millis(200))
            .build();
        RealtimeBackend::new(config)
    }

    #[tokio::test]
    async fn test_starts_disconnected() {
        let backend = test_backend();
        assert!(!backend.is_connected());
    }

    #[tokio::test]
    async fn test_generate_requires_connection() {
        let backend = test_backend();
        let request = DayRequest::new(1, "prompt");

        let err = backend.generate_day(&request).await.unwrap_err();
        assert!(matches!(err, BackendError::NotConnected));
    }

    #[tokio::test]
    async fn test_connect_failure_returns_false() {
        let backend = test_backend();
        assert!(!backend.connect().await);
        assert!(!backend.is_connected());
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        let backend = test_backend();
        backend.disconnect().await;
        backend.disconnect().await;
        assert!(!backend.is_connected());
    }
}
