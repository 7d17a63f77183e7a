//! HealthShare Storage
//!
//! `SQLite` persistence for identities and profiles.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each table owns its own queries (`identities`, `profiles`)
//! - **Capability impl**: [`SqliteProfileStore`] implements the core `ProfileStore` trait
//! - **No cross-table keys**: identities and profiles join on `uid` only
//!
//! # Example
//!
//! ```rust,no_run
//! use healthshare_storage::{create_pool, run_migrations, SqliteProfileStore};
//! use healthshare_core::{ProfileStore, UserId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://healthshare.db").await?;
//! run_migrations(&pool).await?;
//!
//! let store = SqliteProfileStore::new(pool);
//! let profile = store.get(&UserId::new("some-uid")).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod identities;
pub mod profiles;

pub use context::SqliteProfileStore;
pub use error::StorageError;

use chrono::{DateTime, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StorageError> {
    MIGRATOR.run(pool).await?;
    Ok(())
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `sqlite://healthshare.db`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, StorageError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!(url = %database_url, "Creating SQLite pool");

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

    tracing::debug!("SQLite pool ready");

    Ok(pool)
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn from_millis(ms: i64) -> Result<DateTime<Utc>, StorageError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StorageError::SerializationError(format!("timestamp out of range: {ms}")))
}
