//! Capability traits for the two external collaborators.
//!
//! Both are consumed through `Arc<dyn …>` handles built once at startup and
//! injected into the services that need them.

use crate::error::Result;
use crate::types::{Identity, NewProfile, ProfilePatch, Provisioned, UserId, UserProfile};
use async_trait::async_trait;

/// Document store holding one profile per identity.
///
/// Timestamps (`createdAt`, `updatedAt`, `lastLoginAt`) are assigned by the
/// store, never by callers. Each method is atomic per document.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile. `Ok(None)` when absent.
    async fn get(&self, uid: &UserId) -> Result<Option<UserProfile>>;

    /// Create the profile unless one already exists for `uid`.
    ///
    /// Calling this again for an existing uid returns the stored record
    /// unchanged with `created == false`.
    async fn create_if_absent(&self, profile: NewProfile) -> Result<Provisioned>;

    /// Merge the supplied fields into the existing record and bump
    /// `updatedAt`. Returns the merged record, or `Ok(None)` when no profile
    /// exists for `uid`.
    async fn merge(&self, uid: &UserId, patch: &ProfilePatch) -> Result<Option<UserProfile>>;

    /// Stamp `lastLoginAt`. Returns the updated record, or `Ok(None)` when
    /// no profile exists.
    async fn record_login(&self, uid: &UserId) -> Result<Option<UserProfile>>;

    /// All profiles ordered by name
    async fn list(&self) -> Result<Vec<UserProfile>>;
}

/// Issues and verifies user credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register an email/password identity.
    ///
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity>;

    /// Check an email/password pair.
    ///
    /// Fails with `IdentityNotFound` or `BadCredential`.
    async fn verify_identity(&self, email: &str, password: &str) -> Result<Identity>;

    /// Exchange a federated assertion for an identity, creating or linking
    /// one on first use.
    async fn federated_sign_in(&self, assertion: &str) -> Result<Identity>;

    /// Look up an identity by uid
    async fn get_identity(&self, uid: &UserId) -> Result<Option<Identity>>;
}
