/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database connection error
    #[error("Database connection error: {0}")]
    Connection(String),

    /// Unique constraint violated
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Stored value could not be mapped to a domain type
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Map an insert failure, turning unique violations into `Duplicate`
    pub(crate) fn from_insert(err: sqlx::Error, what: impl Into<String>) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::Duplicate(what.into()),
            _ => Self::Database(err),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::Migration(err.to_string())
    }
}

impl From<StorageError> for healthshare_core::HealthShareError {
    fn from(err: StorageError) -> Self {
        healthshare_core::HealthShareError::store_unavailable(err.to_string())
    }
}
