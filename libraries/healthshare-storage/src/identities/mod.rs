//! Identity and credential queries

use crate::{now_millis, StorageError};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

type Result<T> = std::result::Result<T, StorageError>;

/// Stored identity row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub uid: String,
    /// Normalized (trimmed, lower-cased)
    pub email: String,
    pub display_name: String,
    /// `None` for identities that only sign in through federation
    pub password_hash: Option<String>,
    pub federated_subject: Option<String>,
    pub created_at: i64,
}

fn row_to_record(row: &SqliteRow) -> Result<IdentityRecord> {
    Ok(IdentityRecord {
        uid: row.try_get("uid")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        password_hash: row.try_get("password_hash")?,
        federated_subject: row.try_get("federated_subject")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Create a new identity
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `uid` - Identifier shared with the profile store
/// * `email` - Normalized email
/// * `display_name` - Name given at sign-up, reused when re-provisioning
/// * `password_hash` - Already hashed password, if any
/// * `federated_subject` - Subject from the identity broker, if any
///
/// # Errors
///
/// Returns `StorageError::Duplicate` if the email or federated subject is taken
pub async fn create(
    pool: &SqlitePool,
    uid: &str,
    email: &str,
    display_name: &str,
    password_hash: Option<&str>,
    federated_subject: Option<&str>,
) -> Result<IdentityRecord> {
    let now = now_millis();

    sqlx::query(
        "INSERT INTO identities (uid, email, display_name, password_hash, federated_subject, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(uid)
    .bind(email)
    .bind(display_name)
    .bind(password_hash)
    .bind(federated_subject)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| StorageError::from_insert(e, email))?;

    Ok(IdentityRecord {
        uid: uid.to_string(),
        email: email.to_string(),
        display_name: display_name.to_string(),
        password_hash: password_hash.map(str::to_string),
        federated_subject: federated_subject.map(str::to_string),
        created_at: now,
    })
}

/// Get an identity by uid
pub async fn get_by_uid(pool: &SqlitePool, uid: &str) -> Result<Option<IdentityRecord>> {
    let row = sqlx::query(
        "SELECT uid, email, display_name, password_hash, federated_subject, created_at
         FROM identities WHERE uid = ?",
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_record).transpose()
}

/// Get an identity by normalized email
pub async fn get_by_email(pool: &SqlitePool, email: &str) -> Result<Option<IdentityRecord>> {
    let row = sqlx::query(
        "SELECT uid, email, display_name, password_hash, federated_subject, created_at
         FROM identities WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_record).transpose()
}

/// Get an identity by federated subject
pub async fn get_by_federated_subject(
    pool: &SqlitePool,
    subject: &str,
) -> Result<Option<IdentityRecord>> {
    let row = sqlx::query(
        "SELECT uid, email, display_name, password_hash, federated_subject, created_at
         FROM identities WHERE federated_subject = ?",
    )
    .bind(subject)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_record).transpose()
}

/// Attach a federated subject to an identity that has none yet
///
/// # Returns
///
/// `true` if the subject was linked
pub async fn link_federated_subject(pool: &SqlitePool, uid: &str, subject: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE identities SET federated_subject = ?
         WHERE uid = ? AND federated_subject IS NULL",
    )
    .bind(subject)
    .bind(uid)
    .execute(pool)
    .await
    .map_err(|e| StorageError::from_insert(e, subject))?;

    Ok(result.rows_affected() > 0)
}

/// Get all identities ordered by email
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<IdentityRecord>> {
    let rows = sqlx::query(
        "SELECT uid, email, display_name, password_hash, federated_subject, created_at
         FROM identities ORDER BY email",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_record).collect()
}
