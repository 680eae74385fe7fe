//! SQLite persistence layer for mealgen.
//!
//! This crate provides async database operations for profiles, meal
//! sessions, and the ingredient/sauce catalog using SQLx with SQLite.
//!
//! The meal session table is the sole synchronization point between the
//! orchestrator (writer) and the progress publisher / status endpoints
//! (readers): every write is immediately visible to concurrent readers.
//!
//! # Example
//!
//! ```no_run
//! use database::{session, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:mealgen.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let found = session::find_session(db.pool(), "some-session-id").await?;
//!     println!("session: {:?}", found);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod error;
pub mod models;
pub mod profile;
pub mod session;
pub mod validation;

pub use error::{DatabaseError, Result};
pub use models::{CatalogItem, DayTotal, Goal, MealSession, PlanSummary, Profile, SessionStatus};
pub use profile::NewProfile;
pub use validation::{GenerationRequest, ValidationError};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    /// Sized for concurrent generation runs plus publisher polling.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .test_before_acquire(false)
            .connect_with(options)
            .await?;

        tracing::info!("Connected to database: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
