//! Domain types for HealthShare

mod identity;
mod ids;
mod profile;
pub mod wire;

pub use identity::{normalize_email, Identity};
pub use ids::UserId;
pub use profile::{
    NewProfile, Preferences, PreferencesUpdate, ProfilePatch, ProfileSummary, ProfileUpdate,
    Provisioned, Role, Theme, UserProfile,
};
