//! Document store for messages, projects and admins.
//!
//! # Backends
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx (production)
//! - [`MemoryStore`] - process-local maps behind a `RwLock` (`memory://`, tests)
//!
//! Handlers only see `Arc<dyn Store>`.
//!
//! ## Tables
//!
//! - `messages` - Contact form submissions
//! - `projects` - Portfolio entries (`display_order` holds the API's `order`)
//! - `admins` - Site-owner credentials (Argon2id hashes only)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p portfolio-cli -- migrate
//! ```

mod admins;
mod memory;
mod messages;
mod projects;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use portfolio_core::{
    AdminProfile, Message, MessageId, NewMessage, NewProject, Project, ProjectId,
};

use crate::config::{ServerConfig, StoreBackend};
use crate::models::{AdminCredentials, NewAdmin};

pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Totals over the message inbox.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageCounts {
    pub total: i64,
    pub unread: i64,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// All messages, newest first.
    async fn list_messages(&self) -> Result<Vec<Message>, RepositoryError>;

    /// Persist a new unread message stamped with the current time.
    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError>;

    /// Set the read flag. `None` when no message has this id.
    async fn mark_message_read(&self, id: MessageId) -> Result<Option<Message>, RepositoryError>;

    /// Returns `false` when no message has this id.
    async fn delete_message(&self, id: MessageId) -> Result<bool, RepositoryError>;

    async fn message_counts(&self) -> Result<MessageCounts, RepositoryError>;
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// All projects by display order, ties newest first.
    async fn list_projects(&self) -> Result<Vec<Project>, RepositoryError>;

    async fn get_project(&self, id: ProjectId) -> Result<Option<Project>, RepositoryError>;

    async fn create_project(&self, project: NewProject) -> Result<Project, RepositoryError>;

    /// Replace every editable field. `None` when no project has this id.
    async fn update_project(
        &self,
        id: ProjectId,
        project: NewProject,
    ) -> Result<Option<Project>, RepositoryError>;

    /// Returns `false` when no project has this id.
    async fn delete_project(&self, id: ProjectId) -> Result<bool, RepositoryError>;

    async fn count_projects(&self) -> Result<i64, RepositoryError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn count_admins(&self) -> Result<i64, RepositoryError>;

    /// Look up an admin and its password hash by exact username.
    async fn find_admin_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError>;

    /// Insert the admin only if no admin exists yet.
    ///
    /// The emptiness check and the insert happen atomically. Returns `None`
    /// when an admin already exists.
    async fn create_first_admin(
        &self,
        admin: NewAdmin,
    ) -> Result<Option<AdminProfile>, RepositoryError>;
}

/// Everything the API needs from persistence.
#[async_trait]
pub trait Store: MessageRepository + ProjectRepository + AdminRepository {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL`-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply the embedded migrations.
///
/// # Errors
///
/// Returns `RepositoryError::Migration` if any migration fails.
pub async fn migrate(pool: &PgPool) -> Result<(), RepositoryError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Open the store selected by the configuration.
///
/// `PostgreSQL` stores are migrated before use.
///
/// # Errors
///
/// Returns `RepositoryError` if the database cannot be reached or migrated.
pub async fn connect(config: &ServerConfig) -> Result<Arc<dyn Store>, RepositoryError> {
    match config.store_backend() {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = create_pool(&config.database_url).await?;
            migrate(&pool).await?;
            tracing::info!("Database connected and migrated");
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

/// Map a unique-constraint failure to `Conflict`, anything else to `Database`.
fn conflict_or_database(err: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(err)
}
