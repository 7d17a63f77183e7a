/// Profile service - read, merge-write and provisioning of user profiles
use healthshare_core::{
    HealthShareError, NewProfile, ProfileStore, ProfileSummary, ProfileUpdate, Provisioned,
    Result, UserId, UserProfile,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

fn require_uid(raw: Option<&str>) -> Result<UserId> {
    raw.and_then(UserId::parse)
        .ok_or_else(|| HealthShareError::invalid_request("uid is required"))
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Fetch a profile. `Ok(None)` means the uid has no profile yet.
    pub async fn read(&self, uid: Option<&str>) -> Result<Option<UserProfile>> {
        let uid = require_uid(uid)?;

        self.store.get(&uid).await.map_err(|e| {
            tracing::error!(uid = %uid, error = %e, "Failed to read profile");
            e
        })
    }

    /// Merge the supplied fields into an existing profile
    ///
    /// Fields that are not supplied keep their stored values. The returned
    /// record is the merged state as persisted.
    pub async fn write(&self, uid: Option<&str>, update: ProfileUpdate) -> Result<UserProfile> {
        let uid = require_uid(uid)?;
        let patch = update.validate()?;

        let merged = self.store.merge(&uid, &patch).await.map_err(|e| {
            tracing::error!(uid = %uid, error = %e, "Failed to write profile");
            e
        })?;

        match merged {
            Some(profile) => {
                tracing::info!(uid = %uid, "Profile updated");
                Ok(profile)
            }
            None => Err(HealthShareError::NotFound(uid)),
        }
    }

    /// Create the profile for a new identity unless it already exists
    pub async fn provision(&self, uid: &UserId, name: &str, email: &str) -> Result<Provisioned> {
        let new_profile = NewProfile::new(uid.clone(), name, email)?;

        let provisioned = self.store.create_if_absent(new_profile).await.map_err(|e| {
            tracing::error!(uid = %uid, error = %e, "Failed to provision profile");
            e
        })?;

        if provisioned.created {
            tracing::info!(uid = %uid, "Profile provisioned");
        }
        Ok(provisioned)
    }

    /// Stamp the last sign-in time
    pub async fn record_sign_in(&self, uid: &UserId) -> Result<Option<UserProfile>> {
        self.store.record_login(uid).await.map_err(|e| {
            tracing::error!(uid = %uid, error = %e, "Failed to record sign-in");
            e
        })
    }

    /// All profiles as summaries, ordered by name
    pub async fn list(&self) -> Result<Vec<ProfileSummary>> {
        let profiles = self.store.list().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to list profiles");
            e
        })?;
        Ok(profiles.iter().map(UserProfile::summary).collect())
    }
}
