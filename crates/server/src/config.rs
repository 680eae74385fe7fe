//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

/// Mealgen server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Whether to hand generation runs to the background worker. When
    /// disabled, the generate endpoint blocks until the run is terminal.
    pub background_dispatch: bool,
    /// Whether to seed the default catalog at startup.
    pub seed_catalog: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `MEALGEN_ADDR` | Server bind address | `127.0.0.1:8080` |
    /// | `MEALGEN_DATABASE_URL` | SQLite database URL | `sqlite:mealgen.db?mode=rwc` |
    /// | `MEALGEN_BACKGROUND_DISPATCH` | Queue runs on the worker | `true` |
    /// | `MEALGEN_SEED_CATALOG` | Seed default catalog at startup | `true` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("MEALGEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("MEALGEN_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:mealgen.db?mode=rwc".to_string());

        let background_dispatch = env::var("MEALGEN_BACKGROUND_DISPATCH")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        let seed_catalog = env::var("MEALGEN_SEED_CATALOG")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true);

        Ok(Self {
            addr,
            database_url,
            background_dispatch,
            seed_catalog,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid MEALGEN_ADDR format")]
    InvalidAddr,
}
