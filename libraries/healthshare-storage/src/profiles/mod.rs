//! Profile document queries
//!
//! Every mutation is a single SQL statement so each document is updated
//! atomically. `updated_at` is strictly monotonic per document: a merge
//! stamps `max(now, previous + 1)`.

use crate::{from_millis, now_millis, StorageError};
use healthshare_core::types::{NewProfile, Preferences, ProfilePatch, Role, Theme, UserId, UserProfile};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

type Result<T> = std::result::Result<T, StorageError>;

fn row_to_profile(row: &SqliteRow) -> Result<UserProfile> {
    let role: String = row.try_get("role")?;
    let theme: String = row.try_get("theme")?;
    let last_login_at: Option<i64> = row.try_get("last_login_at")?;

    Ok(UserProfile {
        uid: UserId::new(row.try_get::<String, _>("uid")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        role: role
            .parse::<Role>()
            .map_err(|e| StorageError::SerializationError(e.to_string()))?,
        bio: row.try_get("bio")?,
        avatar_url: row.try_get("avatar_url")?,
        preferences: Preferences {
            theme: theme
                .parse::<Theme>()
                .map_err(|e| StorageError::SerializationError(e.to_string()))?,
        },
        created_at: from_millis(row.try_get("created_at")?)?,
        updated_at: from_millis(row.try_get("updated_at")?)?,
        last_login_at: last_login_at.map(from_millis).transpose()?,
    })
}

/// Get a profile by uid
pub async fn get_by_uid(pool: &SqlitePool, uid: &str) -> Result<Option<UserProfile>> {
    let row = sqlx::query(
        "SELECT uid, name, email, role, bio, avatar_url, theme,
                created_at, updated_at, last_login_at
         FROM profiles WHERE uid = ?",
    )
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_profile).transpose()
}

/// Insert a profile with default role, bio, avatar and theme unless one
/// already exists for the uid.
///
/// # Returns
///
/// `true` if a row was inserted, `false` if the uid was already provisioned
pub async fn insert_if_absent(pool: &SqlitePool, profile: &NewProfile) -> Result<bool> {
    let now = now_millis();

    let result = sqlx::query(
        "INSERT INTO profiles (uid, name, email, role, bio, avatar_url, theme, created_at, updated_at)
         VALUES (?, ?, ?, 'user', '', '', 'light', ?, ?)
         ON CONFLICT(uid) DO NOTHING",
    )
    .bind(profile.uid.as_str())
    .bind(&profile.name)
    .bind(&profile.email)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Merge the supplied fields into an existing profile
///
/// Fields that are `None` in the patch keep their stored value.
///
/// # Returns
///
/// The merged record, or `None` if no profile exists for the uid
pub async fn merge(
    pool: &SqlitePool,
    uid: &str,
    patch: &ProfilePatch,
) -> Result<Option<UserProfile>> {
    let now = now_millis();

    let row = sqlx::query(
        "UPDATE profiles SET
             name = COALESCE(?, name),
             role = COALESCE(?, role),
             bio = COALESCE(?, bio),
             avatar_url = COALESCE(?, avatar_url),
             theme = COALESCE(?, theme),
             updated_at = MAX(?, updated_at + 1)
         WHERE uid = ?
         RETURNING uid, name, email, role, bio, avatar_url, theme,
                   created_at, updated_at, last_login_at",
    )
    .bind(patch.name.as_deref())
    .bind(patch.role.map(|r| r.as_str()))
    .bind(patch.bio.as_deref())
    .bind(patch.avatar_url.as_deref())
    .bind(patch.theme.map(|t| t.as_str()))
    .bind(now)
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_profile).transpose()
}

/// Stamp the last sign-in time
pub async fn touch_last_login(pool: &SqlitePool, uid: &str) -> Result<Option<UserProfile>> {
    let row = sqlx::query(
        "UPDATE profiles SET last_login_at = ?
         WHERE uid = ?
         RETURNING uid, name, email, role, bio, avatar_url, theme,
                   created_at, updated_at, last_login_at",
    )
    .bind(now_millis())
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(row_to_profile).transpose()
}

/// Get all profiles ordered by name
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<UserProfile>> {
    let rows = sqlx::query(
        "SELECT uid, name, email, role, bio, avatar_url, theme,
                created_at, updated_at, last_login_at
         FROM profiles ORDER BY name, uid",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_profile).collect()
}
