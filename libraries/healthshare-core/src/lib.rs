//! HealthShare Core
//!
//! Platform-agnostic types, capability traits, and error handling shared by
//! the HealthShare server, storage layer, and client.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `UserProfile`, `Identity`, `Role`, partial updates
//! - **Capability Traits**: `ProfileStore`, `IdentityProvider`
//! - **Session Guard**: token-presence route filter
//! - **Error Handling**: Unified `HealthShareError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use healthshare_core::types::{ProfileUpdate, Role};
//!
//! let patch = ProfileUpdate::default()
//!     .name("Alice")
//!     .role("editor")
//!     .validate()
//!     .unwrap();
//! assert_eq!(patch.role, Some(Role::Editor));
//!
//! // Roles outside the allow-list are rejected, never coerced
//! assert!(ProfileUpdate::default().role("root").validate().is_err());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod guard;
pub mod traits;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{HealthShareError, Result};
pub use guard::{GuardDecision, PathPattern, SessionGuard};
pub use traits::{IdentityProvider, ProfileStore};
pub use types::{
    normalize_email, Identity, NewProfile, Preferences, ProfilePatch, ProfileSummary,
    ProfileUpdate, Provisioned, Role, Theme, UserId, UserProfile,
};
