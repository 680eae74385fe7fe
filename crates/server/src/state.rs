//! Application state shared across handlers.

use std::sync::Arc;

use database::Database;
use orchestrator::{Dispatcher, ProgressPublisher};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Dispatcher for generation runs.
    pub dispatcher: Arc<Dispatcher>,
    /// Progress stream publisher.
    pub publisher: ProgressPublisher,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, dispatcher: Arc<Dispatcher>, publisher: ProgressPublisher) -> Self {
        Self {
            db,
            dispatcher,
            publisher,
        }
    }
}
