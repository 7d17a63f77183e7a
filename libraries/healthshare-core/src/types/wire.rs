//! Request and response bodies shared by the server and the client.

use crate::types::{PreferencesUpdate, ProfileUpdate, Role, UserId, UserProfile};
use serde::{Deserialize, Serialize};

/// Body for `POST /api/auth/sign-up`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body for `POST /api/auth/sign-in`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Body for `POST /api/auth/federated`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedSignInRequest {
    /// Signed assertion issued by the upstream identity broker
    pub assertion: String,
}

/// Returned by every successful sign-up / sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub uid: UserId,
    pub id_token: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Token validity in seconds
    pub expires_in: u64,
}

/// Body of `GET /api/profile`; `user` is `null` when no profile exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEnvelope {
    pub user: Option<UserProfile>,
}

/// Body for `POST /api/profile`
///
/// `uid` is optional at the type level so that a missing identifier is
/// reported as `invalid_request` instead of a body parse failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WriteProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PreferencesUpdate>,
}

impl WriteProfileRequest {
    pub fn new(uid: &UserId, update: ProfileUpdate) -> Self {
        Self {
            uid: Some(uid.as_str().to_string()),
            name: update.name,
            role: update.role,
            bio: update.bio,
            avatar_url: update.avatar_url,
            preferences: update.preferences,
        }
    }

    pub fn into_parts(self) -> (Option<String>, ProfileUpdate) {
        (
            self.uid,
            ProfileUpdate {
                name: self.name,
                role: self.role,
                bio: self.bio,
                avatar_url: self.avatar_url,
                preferences: self.preferences,
            },
        )
    }
}

/// Response of a successful profile write, carrying the merged record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
}

/// Error body returned by every failing API call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}
