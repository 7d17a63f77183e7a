//! Profile capability consumed by the profile view.

use crate::client::HealthShareClient;
use crate::error::Result;
use async_trait::async_trait;
use healthshare_core::{ProfileUpdate, UserId, UserProfile};

/// Remote profile operations the view depends on
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileApi: Send + Sync {
    /// `Ok(None)` when no profile exists for `uid`
    async fn fetch_profile(&self, uid: &UserId) -> Result<Option<UserProfile>>;

    /// Merge-write and return the server's merged record
    async fn save_profile(&self, uid: &UserId, update: ProfileUpdate) -> Result<UserProfile>;
}

#[async_trait]
impl ProfileApi for HealthShareClient {
    async fn fetch_profile(&self, uid: &UserId) -> Result<Option<UserProfile>> {
        self.get_profile(uid).await
    }

    async fn save_profile(&self, uid: &UserId, update: ProfileUpdate) -> Result<UserProfile> {
        self.update_profile(uid, update).await
    }
}
