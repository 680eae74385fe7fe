//! Inline vs background execution of generation runs.
//!
//! The dispatcher decouples "a session was created" from "the run loop is
//! executing". Inline mode blocks the caller (used by tests and
//! single-process deployments); background mode hands a typed job to a
//! worker queue with bounded attempts and increasing backoff. Either way, a
//! session is never left in `processing` once the dispatcher gives up.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use database::{session, Database};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};
use tracing::{error, info, warn};

use crate::error::OrchestratorError;

/// Typed background job payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    /// Session to drive to a terminal status.
    pub session_id: String,
}

/// One attempt at driving a session to a terminal status.
///
/// Implementations construct their backends fresh per call so concurrent
/// runs never share connection state.
#[async_trait]
pub trait RunJob: Send + Sync {
    /// Execute one full run attempt for the session.
    async fn execute(&self, session_id: &str) -> Result<(), OrchestratorError>;
}

/// Tuning for the background worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Total attempts per job.
    pub max_attempts: u32,
    /// Waits between successive attempts.
    pub backoff: Vec<Duration>,
    /// Execution budget per attempt.
    pub attempt_timeout: Duration,
    /// Queue depth before dispatch blocks.
    pub queue_depth: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: vec![
                Duration::from_secs(60),
                Duration::from_secs(120),
                Duration::from_secs(300),
            ],
            attempt_timeout: Duration::from_secs(1800),
            queue_depth: 64,
        }
    }
}

enum Mode {
    Inline,
    Background(mpsc::Sender<GenerationJob>),
}

/// Chooses how a freshly created session gets executed.
pub struct Dispatcher {
    db: Database,
    job: Arc<dyn RunJob>,
    mode: Mode,
}

impl Dispatcher {
    /// Run every dispatched session inline: the caller blocks until the run
    /// reaches a terminal status.
    pub fn inline(db: Database, job: Arc<dyn RunJob>) -> Self {
        Self {
            db,
            job,
            mode: Mode::Inline,
        }
    }

    /// Run dispatched sessions on a background worker with bounded retries.
    pub fn background(db: Database, job: Arc<dyn RunJob>, config: WorkerConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_depth);

        let worker_db = db.clone();
        let worker_job = job.clone();
        tokio::spawn(async move {
            worker_loop(worker_db, worker_job, config, rx).await;
        });

        Self {
            db,
            job,
            mode: Mode::Background(tx),
        }
    }

    /// Start execution for a session.
    ///
    /// Background mode returns as soon as the job is queued.
    pub async fn dispatch(&self, session_id: &str) -> Result<(), OrchestratorError> {
        match self.mode {
            Mode::Inline => {
                let result = self.job.execute(session_id).await;
                if let Err(ref e) = result {
                    ensure_failed(&self.db, session_id, &e.to_string()).await;
                }
                result
            }
            Mode::Background(ref tx) => {
                let job = GenerationJob {
                    session_id: session_id.to_string(),
                };
                tx.send(job).await.map_err(|_| {
                    OrchestratorError::Dispatch("background worker is gone".to_string())
                })?;
                info!(session_id, "Queued generation job");
                Ok(())
            }
        }
    }
}

async fn worker_loop(
    db: Database,
    job: Arc<dyn RunJob>,
    config: WorkerConfig,
    mut rx: mpsc::Receiver<GenerationJob>,
) {
    info!("Generation worker started");

    while let Some(GenerationJob { session_id }) = rx.recv().await {
        run_with_retries(&db, job.as_ref(), &config, &session_id).await;
    }

    info!("Generation worker stopped");
}

async fn run_with_retries(db: &Database, job: &dyn RunJob, config: &WorkerConfig, session_id: &str) {
    let mut last_error = String::new();

    for attempt in 1..=config.max_attempts {
        info!(session_id, attempt, "Starting generation attempt");

        match timeout(config.attempt_timeout, job.execute(session_id)).await {
            Ok(Ok(())) => {
                info!(session_id, attempt, "Generation attempt succeeded");
                return;
            }
            Ok(Err(e)) => {
                warn!(session_id, attempt, error = %e, "Generation attempt failed");
                last_error = e.to_string();
            }
            Err(_) => {
                warn!(
                    session_id,
                    attempt,
                    budget_secs = config.attempt_timeout.as_secs(),
                    "Generation attempt timed out"
                );
                last_error = format!(
                    "attempt timed out after {}s",
                    config.attempt_timeout.as_secs()
                );
            }
        }

        if attempt < config.max_attempts {
            let delay = config
                .backoff
                .get((attempt - 1) as usize)
                .copied()
                .unwrap_or(Duration::from_secs(60));
            sleep(delay).await;
        }
    }

    let message = format!(
        "job failed after {} attempts: {}",
        config.max_attempts, last_error
    );
    ensure_failed(db, session_id, &message).await;
}

/// Guarantee the session is terminal after the dispatcher gives up on it.
async fn ensure_failed(db: &Database, session_id: &str, message: &str) {
    match session::find_session(db.pool(), session_id).await {
        Ok(Some(stored)) if !stored.status.is_terminal() => {
            if let Err(e) = session::fail_session(db.pool(), session_id, message).await {
                error!(session_id, error = %e, "Could not mark session failed");
            }
        }
        Ok(_) => {}
        Err(e) => {
            error!(session_id, error = %e, "Could not read session after failure");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use database::validation::GenerationRequest;
    use database::{catalog, profile, MealSession, SessionStatus};

    use crate::metrics::derive_profile;

    /// Job that fails a fixed number of times before succeeding.
    struct FlakyJob {
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakyJob {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RunJob for FlakyJob {
        async fn execute(&self, _session_id: &str) -> Result<(), OrchestratorError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(OrchestratorError::Dispatch(format!("induced failure {call}")))
            } else {
                Ok(())
            }
        }
    }

    /// Job that never finishes within any attempt budget.
    struct HangingJob;

    #[async_trait]
    impl RunJob for HangingJob {
        async fn execute(&self, _session_id: &str) -> Result<(), OrchestratorError> {
            sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    fn fast_worker_config() -> WorkerConfig {
        WorkerConfig {
            max_attempts: 3,
            backoff: vec![
                Duration::from_secs(60),
                Duration::from_secs(120),
                Duration::from_secs(300),
            ],
            attempt_timeout: Duration::from_secs(1800),
            queue_depth: 8,
        }
    }

    async fn test_db() -> Database {
        // A single-connection pool keeps every query on the one in-memory
        // database (each fresh `sqlite::memory:` connection is a separate,
        // empty DB) and avoids establishing a connection under a paused clock.
        let db = Database::connect_with_pool_size("sqlite::memory:", 1)
            .await
            .unwrap();
        db.migrate().await.unwrap();
        catalog::seed_defaults(db.pool()).await.unwrap();
        db
    }

    async fn seed_session(db: &Database, device_id: &str) -> MealSession {
        let request = GenerationRequest {
            device_id: Some(device_id.to_string()),
            age: 30,
            height: 180.0,
            weight: 80.0,
            gender: "male".to_string(),
            activity_level: "Sedentary (little or no exercise)".to_string(),
            neck_circumference: 38.0,
            waist_circumference: 90.0,
            hip_circumference: None,
            plan_period: Some(7),
        };
        let new_profile = derive_profile(&request);
        let created = profile::create_profile(db.pool(), &new_profile).await.unwrap();
        session::create_session(db.pool(), &created.id, 7, Some(created.goal))
            .await
            .unwrap()
    }

    async fn wait_for_status(db: &Database, id: &str, status: SessionStatus) -> MealSession {
        loop {
            let stored = session::get_session(db.pool(), id).await.unwrap();
            if stored.status == status {
                return stored;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_inline_success() {
        let db = test_db().await;
        let created = seed_session(&db, "device-1").await;

        let job = Arc::new(FlakyJob::new(0));
        let dispatcher = Dispatcher::inline(db, job.clone());

        dispatcher.dispatch(&created.id).await.unwrap();
        assert_eq!(job.calls(), 1);
    }

    #[tokio::test]
    async fn test_inline_failure_marks_session_failed() {
        let db = test_db().await;
        let created = seed_session(&db, "device-1").await;

        // Simulate a run that errored without reaching its own fail path.
        session::update_status(db.pool(), &created.id, SessionStatus::Processing)
            .await
            .unwrap();

        let job = Arc::new(FlakyJob::new(10));
        let dispatcher = Dispatcher::inline(db.clone(), job);

        let result = dispatcher.dispatch(&created.id).await;
        assert!(result.is_err());

        let stored = session::get_session(db.pool(), &created.id).await.unwrap();
        assert_eq!(stored.status, SessionStatus::Failed);
        assert!(stored.error_message.unwrap().contains("induced failure"));
    }

    #[tokio::test]
    async fn test_background_retries_until_success() {
        let db = test_db().await;
        let created = seed_session(&db, "device-1").await;
        tokio::time::pause();

        let job = Arc::new(FlakyJob::new(2));
        let dispatcher = Dispatcher::background(db.clone(), job.clone(), fast_worker_config());

        dispatcher.dispatch(&created.id).await.unwrap();

        // Third attempt succeeds after the 60s and 120s backoffs.
        while job.calls() < 3 {
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(job.calls(), 3);

        // Success leaves the stored status alone.
        let stored = session::get_session(db.pool(), &created.id).await.unwrap();
        assert_ne!(stored.status, SessionStatus::Failed);
    }

    #[tokio::test]
    async fn test_background_exhaustion_marks_failed() {
        let db = test_db().await;
        let created = seed_session(&db, "device-1").await;
        session::update_status(db.pool(), &created.id, SessionStatus::Processing)
            .await
            .unwrap();
        tokio::time::pause();

        let job = Arc::new(FlakyJob::new(u32::MAX));
        let dispatcher = Dispatcher::background(db.clone(), job.clone(), fast_worker_config());

        dispatcher.dispatch(&created.id).await.unwrap();

        let stored = wait_for_status(&db, &created.id, SessionStatus::Failed).await;
        assert_eq!(job.calls(), 3);
        assert!(stored
            .error_message
            .unwrap()
            .starts_with("job failed after 3 attempts"));
    }

    #[tokio::test]
    async fn test_background_attempt_timeout() {
        let db = test_db().await;
        let created = seed_session(&db, "device-1").await;
        session::update_status(db.pool(), &created.id, SessionStatus::Processing)
            .await
            .unwrap();
        tokio::time::pause();

        let dispatcher =
            Dispatcher::background(db.clone(), Arc::new(HangingJob), fast_worker_config());
        dispatcher.dispatch(&created.id).await.unwrap();

        let stored = wait_for_status(&db, &created.id, SessionStatus::Failed).await;
        assert!(stored.error_message.unwrap().contains("timed out after 1800s"));
    }

    #[tokio::test]
    async fn test_background_processes_queue_in_order() {
        let db = test_db().await;
        let first = seed_session(&db, "device-1").await;
        let second = seed_session(&db, "device-2").await;
        tokio::time::pause();

        let job = Arc::new(FlakyJob::new(0));
        let dispatcher = Dispatcher::background(db.clone(), job.clone(), fast_worker_config());

        dispatcher.dispatch(&first.id).await.unwrap();
        dispatcher.dispatch(&second.id).await.unwrap();

        while job.calls() < 2 {
            sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(job.calls(), 2);
    }
}
