use crate::profiles;
use async_trait::async_trait;
use healthshare_core::{
    error::Result, traits::ProfileStore, NewProfile, ProfilePatch, Provisioned, UserId,
    UserProfile,
};
use sqlx::SqlitePool;

/// `SQLite`-backed profile store
#[derive(Clone)]
pub struct SqliteProfileStore {
    pool: SqlitePool,
}

impl SqliteProfileStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for SqliteProfileStore {
    async fn get(&self, uid: &UserId) -> Result<Option<UserProfile>> {
        Ok(profiles::get_by_uid(&self.pool, uid.as_str()).await?)
    }

    async fn create_if_absent(&self, profile: NewProfile) -> Result<Provisioned> {
        let created = profiles::insert_if_absent(&self.pool, &profile).await?;
        let stored = profiles::get_by_uid(&self.pool, profile.uid.as_str())
            .await?
            .ok_or_else(|| {
                healthshare_core::HealthShareError::store_unavailable(format!(
                    "profile {} vanished after provisioning",
                    profile.uid
                ))
            })?;

        Ok(Provisioned {
            profile: stored,
            created,
        })
    }

    async fn merge(&self, uid: &UserId, patch: &ProfilePatch) -> Result<Option<UserProfile>> {
        Ok(profiles::merge(&self.pool, uid.as_str(), patch).await?)
    }

    async fn record_login(&self, uid: &UserId) -> Result<Option<UserProfile>> {
        Ok(profiles::touch_last_login(&self.pool, uid.as_str()).await?)
    }

    async fn list(&self) -> Result<Vec<UserProfile>> {
        Ok(profiles::get_all(&self.pool).await?)
    }
}
