//! The production run job: fresh backends per attempt.

use std::sync::Arc;

use async_trait::async_trait;
use chat_backend::{ChatBackend, ChatBackendConfig};
use database::Database;
use orchestrator::{GenerationRun, OrchestratorError, RunConfig, RunJob};
use realtime_backend::{RealtimeBackend, RealtimeBackendConfig};

/// Builds one [`GenerationRun`] per attempt from stored configs.
///
/// Backends are constructed inside `execute`, so every attempt gets its own
/// connection state and concurrent runs cannot interfere.
pub struct BackendRunJob {
    db: Database,
    run_config: RunConfig,
    chat_config: ChatBackendConfig,
    realtime_config: Option<RealtimeBackendConfig>,
}

impl BackendRunJob {
    /// Create a job factory over the given configs.
    pub fn new(
        db: Database,
        run_config: RunConfig,
        chat_config: ChatBackendConfig,
        realtime_config: Option<RealtimeBackendConfig>,
    ) -> Self {
        Self {
            db,
            run_config,
            chat_config,
            realtime_config,
        }
    }
}

#[async_trait]
impl RunJob for BackendRunJob {
    async fn execute(&self, session_id: &str) -> Result<(), OrchestratorError> {
        let fallback = Arc::new(ChatBackend::new(self.chat_config.clone())?);

        let mut run = GenerationRun::new(self.db.clone(), fallback)
            .with_config(self.run_config.clone());

        if let Some(ref realtime_config) = self.realtime_config {
            run = run.with_preferred(Arc::new(RealtimeBackend::new(realtime_config.clone())));
        }

        run.execute(session_id).await
    }
}
