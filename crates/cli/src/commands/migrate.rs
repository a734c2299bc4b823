//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! portfolio-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use portfolio_server::config::{ConfigError, StoreBackend};
use portfolio_server::db::{self, RepositoryError};
use portfolio_server::ServerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] RepositoryError),
}

/// Apply the embedded migrations to the configured database.
///
/// # Errors
///
/// Returns `MigrationError` if the configuration is invalid, the database is
/// unreachable, or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let config = ServerConfig::from_env()?;
    config.log_defaults();

    if config.store_backend() == StoreBackend::Memory {
        tracing::warn!("In-memory store configured; nothing to migrate");
        return Ok(());
    }

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db::migrate(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
