//! Mealgen mobile API server.
//!
//! Wires the database, the generation dispatcher, and the progress
//! publisher into an axum router.

mod config;
mod error;
mod jobs;
mod routes;
mod state;

use std::sync::Arc;

use chat_backend::ChatBackendConfig;
use database::{catalog, Database};
use orchestrator::{Dispatcher, ProgressPublisher, RunConfig, WorkerConfig};
use realtime_backend::RealtimeBackendConfig;
use tracing::info;

use crate::config::Config;
use crate::jobs::BackendRunJob;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting mealgen server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    if config.seed_catalog {
        catalog::seed_defaults(db.pool()).await?;
    }

    // Backend configs: the chat transport is mandatory, the realtime
    // transport joins only when its key is configured.
    let chat_config = ChatBackendConfig::from_env()?;
    let realtime_config = match RealtimeBackendConfig::from_env() {
        Ok(realtime) => Some(realtime),
        Err(_) => {
            info!("Realtime backend not configured, using chat transport only");
            None
        }
    };

    let job = Arc::new(BackendRunJob::new(
        db.clone(),
        RunConfig::default(),
        chat_config,
        realtime_config,
    ));

    let dispatcher = if config.background_dispatch {
        Arc::new(Dispatcher::background(
            db.clone(),
            job,
            WorkerConfig::default(),
        ))
    } else {
        Arc::new(Dispatcher::inline(db.clone(), job))
    };

    let publisher = ProgressPublisher::new(db.clone());

    // Build application state
    let state = AppState::new(db, dispatcher, publisher);

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Mealgen server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
    }
    info!("Shutdown signal received");
}
