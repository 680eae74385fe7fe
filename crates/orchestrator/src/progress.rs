//! Progress streaming: poll-driven typed events over the session store.
//!
//! The publisher never talks to the run loop directly. It re-reads the
//! session row on a fixed cadence and emits at most one event per detected
//! change, so it can run in a different process from the orchestrator with
//! the database as the only synchronization point. The poll task stops as
//! soon as the subscriber goes away.

use std::time::Duration;

use database::{session, Database, DayTotal, PlanSummary, SessionStatus};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Typed progress events, in the order a subscriber can observe them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Emitted once, immediately on subscribe.
    Connected { message: String, session_id: String },
    /// The stored status changed.
    Status {
        status: SessionStatus,
        message: String,
        progress: f64,
    },
    /// The day counter advanced; content may not be stored yet.
    DayProgress {
        day: i64,
        total_days: i64,
        progress: f64,
    },
    /// The advanced day's content was already in the store.
    MealData {
        day: i64,
        meals: serde_json::Value,
        daily_total: Option<DayTotal>,
    },
    /// Follows `MealData` for the same day.
    DayComplete {
        day: i64,
        progress: f64,
        message: String,
    },
    /// Terminal: the run finished.
    Complete {
        total_days: i64,
        session_id: String,
        summary: PlanSummary,
        message: String,
    },
    /// Terminal: the run failed or the session does not exist.
    Error { message: String, session_id: String },
    /// Periodic liveness signal.
    Heartbeat {
        status: SessionStatus,
        progress: f64,
    },
    /// Terminal: the poll ceiling was reached first.
    Timeout { message: String, session_id: String },
}

impl ProgressEvent {
    /// Stable wire name for the event, used as the SSE event type.
    pub fn name(&self) -> &'static str {
        match self {
            ProgressEvent::Connected { .. } => "connected",
            ProgressEvent::Status { .. } => "status",
            ProgressEvent::DayProgress { .. } => "day_progress",
            ProgressEvent::MealData { .. } => "meal_data",
            ProgressEvent::DayComplete { .. } => "day_complete",
            ProgressEvent::Complete { .. } => "complete",
            ProgressEvent::Error { .. } => "error",
            ProgressEvent::Heartbeat { .. } => "heartbeat",
            ProgressEvent::Timeout { .. } => "timeout",
        }
    }

    /// Whether the stream ends after this event.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::Complete { .. }
                | ProgressEvent::Error { .. }
                | ProgressEvent::Timeout { .. }
        )
    }
}

/// Human status line shown alongside status changes.
pub fn status_message(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Pending => "Preparing meal generation...",
        SessionStatus::Processing => "Generating your personalized meal plan...",
        SessionStatus::Completed => "Meal plan generation completed!",
        SessionStatus::Failed => "Meal generation failed",
    }
}

/// Tuning for the publisher poll loop.
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Poll cadence against the session store.
    pub poll_interval: Duration,
    /// Emit a heartbeat every this many polls.
    pub heartbeat_every: u32,
    /// Stop with a timeout event after this many polls without a terminal
    /// status (600 polls at 1s = 10 minutes).
    pub max_polls: u32,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            heartbeat_every: 30,
            max_polls: 600,
        }
    }
}

/// Store-polling progress publisher.
#[derive(Debug, Clone)]
pub struct ProgressPublisher {
    db: Database,
    config: PublisherConfig,
}

impl ProgressPublisher {
    /// Create a publisher with default cadence.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            config: PublisherConfig::default(),
        }
    }

    /// Override the poll tuning.
    pub fn with_config(mut self, config: PublisherConfig) -> Self {
        self.config = config;
        self
    }

    /// Subscribe to a session's progress.
    ///
    /// Returns a receiver fed by a timer-driven task. Dropping the receiver
    /// cancels the task at its next event.
    pub fn subscribe(&self, session_id: &str) -> mpsc::Receiver<ProgressEvent> {
        let (tx, rx) = mpsc::channel(64);
        let db = self.db.clone();
        let config = self.config.clone();
        let session_id = session_id.to_string();

        tokio::spawn(async move {
            poll_loop(db, config, session_id, tx).await;
        });

        rx
    }
}

async fn poll_loop(
    db: Database,
    config: PublisherConfig,
    session_id: String,
    tx: mpsc::Sender<ProgressEvent>,
) {
    let connected = ProgressEvent::Connected {
        message: "Connected to meal generation stream".to_string(),
        session_id: session_id.clone(),
    };
    if tx.send(connected).await.is_err() {
        return;
    }

    let mut ticker = tokio::time::interval(config.poll_interval);
    let mut last_status: Option<SessionStatus> = None;
    let mut last_day: i64 = 0;

    for poll in 1..=config.max_polls {
        ticker.tick().await;

        let events = match observe(&db, &session_id, &mut last_status, &mut last_day).await {
            Ok(events) => events,
            Err(e) => {
                error!(session_id, error = %e, "Stream poll failed");
                let event = ProgressEvent::Error {
                    message: "Stream error occurred".to_string(),
                    session_id: session_id.clone(),
                };
                let _ = tx.send(event).await;
                return;
            }
        };

        let mut terminated = false;
        for event in events {
            terminated = terminated || event.is_terminal();
            if tx.send(event).await.is_err() {
                debug!(session_id, "Subscriber went away, stopping stream");
                return;
            }
        }
        if terminated {
            return;
        }

        if poll % config.heartbeat_every == 0 {
            if let Some(status) = last_status {
                let progress = match session::find_session(db.pool(), &session_id).await {
                    Ok(Some(stored)) => stored.progress(),
                    _ => 0.0,
                };
                let event = ProgressEvent::Heartbeat { status, progress };
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        }
    }

    let event = ProgressEvent::Timeout {
        message: "Stream timeout reached. Please reconnect.".to_string(),
        session_id: session_id.clone(),
    };
    let _ = tx.send(event).await;
}

/// One poll: diff the stored row against the last observed state.
async fn observe(
    db: &Database,
    session_id: &str,
    last_status: &mut Option<SessionStatus>,
    last_day: &mut i64,
) -> database::Result<Vec<ProgressEvent>> {
    let mut events = Vec::new();

    let Some(stored) = session::find_session(db.pool(), session_id).await? else {
        events.push(ProgressEvent::Error {
            message: "Session not found".to_string(),
            session_id: session_id.to_string(),
        });
        return Ok(events);
    };

    let progress = stored.progress();

    if *last_status != Some(stored.status) {
        *last_status = Some(stored.status);
        events.push(ProgressEvent::Status {
            status: stored.status,
            message: status_message(stored.status).to_string(),
            progress,
        });
    }

    if stored.current_day > *last_day {
        *last_day = stored.current_day;
        events.push(ProgressEvent::DayProgress {
            day: stored.current_day,
            total_days: stored.total_days,
            progress,
        });

        // The orchestrator may have written the day's content along with the
        // progress counter; surface it in the same poll when it has.
        let days = stored.meal_days()?;
        let index = (*last_day - 1) as usize;
        if let Some(meals) = days.get(index) {
            let daily_total = stored.day_totals()?.get(index).cloned();
            events.push(ProgressEvent::MealData {
                day: *last_day,
                meals: meals.clone(),
                daily_total,
            });
            events.push(ProgressEvent::DayComplete {
                day: *last_day,
                progress,
                message: format!("Day {} completed successfully", last_day),
            });
        }
    }

    match stored.status {
        SessionStatus::Completed => {
            events.push(ProgressEvent::Complete {
                total_days: stored.total_days,
                session_id: stored.id.clone(),
                summary: stored.summary(),
                message: "Meal generation completed successfully!".to_string(),
            });
        }
        SessionStatus::Failed => {
            events.push(ProgressEvent::Error {
                message: stored
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "Meal generation failed".to_string()),
                session_id: stored.id.clone(),
            });
        }
        SessionStatus::Pending | SessionStatus::Processing => {}
    }

    Ok(events)
}
