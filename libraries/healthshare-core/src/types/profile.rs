/// Profile domain types
use crate::error::{HealthShareError, Result};
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. The set is closed: anything else is rejected at the write
/// path with `InvalidRole`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
    Editor,
    Manager,
    Viewer,
}

impl Role {
    /// Every accepted role, in display order
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::User,
        Role::Editor,
        Role::Manager,
        Role::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
            Role::Editor => "editor",
            Role::Manager => "manager",
            Role::Viewer => "viewer",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl FromStr for Role {
    type Err = HealthShareError;

    /// Exact, case-sensitive match against the allow-list
    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| HealthShareError::InvalidRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = HealthShareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(HealthShareError::invalid_request(format!(
                "theme must be \"light\" or \"dark\", got {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
}

/// Stored profile record, one per identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub bio: String,
    pub avatar_url: String,
    pub preferences: Preferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    pub fn summary(&self) -> ProfileSummary {
        ProfileSummary {
            uid: self.uid.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Listing entry exposed to every authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub uid: UserId,
    pub name: String,
    pub role: Role,
}

/// Input for provisioning a profile for a freshly created identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub uid: UserId,
    pub name: String,
    pub email: String,
}

impl NewProfile {
    pub fn new(uid: UserId, name: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        let name = name.into().trim().to_string();
        if uid.as_str().trim().is_empty() {
            return Err(HealthShareError::invalid_request("uid is required"));
        }
        if name.is_empty() {
            return Err(HealthShareError::invalid_request("name is required"));
        }
        Ok(Self {
            uid,
            name,
            email: email.into().trim().to_lowercase(),
        })
    }
}

/// Result of an idempotent provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    pub profile: UserProfile,
    /// `false` when the profile already existed and was left untouched
    pub created: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Partial, unvalidated field set as submitted by a client.
///
/// Role and theme stay raw strings here so that out-of-range values surface
/// as `InvalidRole` / `InvalidRequest` from [`ProfileUpdate::validate`]
/// rather than as a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileUpdate {
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

impl ProfileUpdate {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn theme(mut self, theme: impl Into<String>) -> Self {
        self.preferences = Some(PreferencesUpdate {
            theme: Some(theme.into()),
        });
        self
    }

    fn theme_value(&self) -> Option<&str> {
        self.preferences.as_ref().and_then(|p| p.theme.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.bio.is_none()
            && self.avatar_url.is_none()
            && self.theme_value().is_none()
    }

    /// Validate into a typed patch.
    ///
    /// Order: non-empty field set, non-blank name, role allow-list, theme.
    pub fn validate(self) -> Result<ProfilePatch> {
        if self.is_empty() {
            return Err(HealthShareError::invalid_request(
                "at least one profile field is required",
            ));
        }

        let name = match self.name {
            Some(name) => {
                let trimmed = name.trim();
                if trimmed.is_empty() {
                    return Err(HealthShareError::invalid_request("name must not be blank"));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let role = self.role.as_deref().map(Role::from_str).transpose()?;
        let theme = self
            .preferences
            .as_ref()
            .and_then(|p| p.theme.as_deref())
            .map(Theme::from_str)
            .transpose()?;

        Ok(ProfilePatch {
            name,
            role,
            bio: self.bio,
            avatar_url: self.avatar_url,
            theme,
        })
    }
}

/// Validated partial field set; `None` means "leave untouched"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub theme: Option<Theme>,
}
