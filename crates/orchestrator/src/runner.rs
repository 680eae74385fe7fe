//! The per-session generation run: day loop, fallback policy, and the
//! early-abort/continue failure policy.

use std::sync::Arc;
use std::time::Duration;

use backend_core::{ConversationWindow, DayRequest, GenerationBackend};
use database::{catalog, profile, session, Database, Goal, SessionStatus};
use tracing::{info, warn};

use crate::error::OrchestratorError;
use crate::parse::parse_day_response;
use crate::prompt::build_day_prompt;

/// Tuning for one generation run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Pause between days, to stay inside backend rate limits. Distinct from
    /// retry backoff; skipped after the final day.
    pub day_delay: Duration,

    /// Days below this index abort the whole run when they fail; days at or
    /// above it are skipped and the run continues.
    pub early_abort_threshold: u32,

    /// Trailing window size in role-tagged messages.
    pub window_entries: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            day_delay: Duration::from_secs(1),
            early_abort_threshold: 3,
            window_entries: 10,
        }
    }
}

/// One generation run over a session.
///
/// Owns its backends for the duration of the run; the preferred channel is
/// released on every exit path. Constructed fresh per run so concurrent runs
/// never share connection state.
pub struct GenerationRun {
    db: Database,
    preferred: Option<Arc<dyn GenerationBackend>>,
    fallback: Arc<dyn GenerationBackend>,
    config: RunConfig,
}

impl GenerationRun {
    /// Create a run that only uses the stateless fallback transport.
    pub fn new(db: Database, fallback: Arc<dyn GenerationBackend>) -> Self {
        Self {
            db,
            preferred: None,
            fallback,
            config: RunConfig::default(),
        }
    }

    /// Add a preferred low-latency transport, tried first each day.
    pub fn with_preferred(mut self, preferred: Arc<dyn GenerationBackend>) -> Self {
        self.preferred = Some(preferred);
        self
    }

    /// Override the run tuning.
    pub fn with_config(mut self, config: RunConfig) -> Self {
        self.config = config;
        self
    }

    /// Drive the session to a terminal status.
    ///
    /// On success the session ends `completed` even when late days were
    /// skipped; an early-day failure ends it `failed` with the causing
    /// message already persisted.
    pub async fn execute(&self, session_id: &str) -> Result<(), OrchestratorError> {
        let result = self.run_loop(session_id).await;

        // Release the channel on every exit path, including early aborts.
        if let Some(ref preferred) = self.preferred {
            preferred.disconnect().await;
        }

        result
    }

    async fn run_loop(&self, session_id: &str) -> Result<(), OrchestratorError> {
        let pool = self.db.pool();

        let stored = session::find_session(pool, session_id)
            .await?
            .ok_or_else(|| OrchestratorError::SessionNotFound(session_id.to_string()))?;
        let profile = profile::get_profile(pool, &stored.profile_id).await?;

        let ingredients = catalog::list_ingredients(pool, catalog::MAX_PROMPT_INGREDIENTS).await?;
        let sauces = catalog::list_sauces(pool, catalog::MAX_PROMPT_SAUCES).await?;

        session::update_status(pool, session_id, SessionStatus::Processing).await?;

        // Prefer the low-latency channel when it comes up; one transport
        // failure demotes to the fallback for the remainder of the run.
        let mut use_preferred = match self.preferred {
            Some(ref preferred) => {
                if preferred.connect().await {
                    info!(session_id, backend = preferred.name(), "Using preferred backend");
                    true
                } else {
                    info!(session_id, backend = self.fallback.name(), "Preferred backend unavailable, using fallback");
                    false
                }
            }
            None => false,
        };

        let mut window = ConversationWindow::new(self.config.window_entries);
        let total_days = stored.total_days;
        let start_day = resume_day(&stored)?;

        if start_day > 1 {
            info!(session_id, start_day, "Resuming interrupted run");
        }

        for day in start_day..=total_days {
            let day = day as u32;

            // Persist progress before generating, so a concurrent observer
            // mid-failure still sees which day was in flight.
            session::update_progress(pool, session_id, day as i64).await?;

            let prompt = build_day_prompt(&profile, day, &ingredients, &sauces);
            let request =
                DayRequest::new(day, prompt.clone()).with_context(window.entries().to_vec());

            let outcome = match self.generate_with_fallback(&mut use_preferred, &request).await {
                Ok(raw) => parse_day_response(&raw).map(|plan| (raw, plan)),
                Err(e) => Err(e),
            };

            match outcome {
                Ok((raw, plan)) => {
                    if day == 1 {
                        if let Some(goal) = plan.goal.as_deref().and_then(Goal::parse) {
                            session::mark_goal(
                                pool,
                                session_id,
                                goal,
                                plan.goal_explanation.as_deref(),
                            )
                            .await?;
                        }
                    }

                    session::append_day_result(
                        pool,
                        session_id,
                        &plan.meals_json(),
                        &plan.day_total(),
                    )
                    .await?;

                    window.push_exchange(&prompt, &raw);
                    info!(session_id, day, meals = plan.meals.len(), "Completed day");

                    if (day as i64) < total_days && !self.config.day_delay.is_zero() {
                        tokio::time::sleep(self.config.day_delay).await;
                    }
                }
                Err(e) => {
                    let message = format!("day {} generation failed: {}", day, e);

                    if day < self.config.early_abort_threshold {
                        // Early failures indicate a systemic problem; stop
                        // the run rather than produce a plan missing its
                        // first days.
                        session::fail_session(pool, session_id, &message).await?;
                        return Err(OrchestratorError::EarlyAbort { day, message });
                    }

                    warn!(session_id, day, error = %e, "Skipping failed day");
                }
            }
        }

        session::complete_session(pool, session_id).await?;
        Ok(())
    }

    /// Try the preferred channel, demoting permanently on its first
    /// transport failure and retrying the same day on the fallback.
    async fn generate_with_fallback(
        &self,
        use_preferred: &mut bool,
        request: &DayRequest,
    ) -> Result<String, OrchestratorError> {
        if *use_preferred {
            if let Some(ref preferred) = self.preferred {
                if preferred.is_connected() {
                    match preferred.generate_day(request).await {
                        Ok(raw) => return Ok(raw),
                        Err(e) => {
                            warn!(
                                day = request.day,
                                error = %e,
                                "Preferred backend failed, demoting to fallback for the rest of the run"
                            );
                            *use_preferred = false;
                        }
                    }
                } else {
                    *use_preferred = false;
                }
            }
        }

        Ok(self.fallback.generate_day(request).await?)
    }
}

/// Which day a run should start (or resume) from.
///
/// A fresh session starts at day 1. An interrupted run resumes at the day
/// that was in flight; if that day's results were already appended, it
/// resumes at the next one.
fn resume_day(stored: &database::MealSession) -> Result<i64, OrchestratorError> {
    if stored.current_day == 0 {
        return Ok(1);
    }

    let appended = stored.meal_days()?.len() as i64;
    if appended >= stored.current_day {
        Ok(stored.current_day + 1)
    } else {
        Ok(stored.current_day)
    }
}
