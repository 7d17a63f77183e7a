/// Server services
pub mod accounts;
pub mod auth;
pub mod identity;
pub mod profile;

pub use accounts::AccountService;
pub use auth::AuthService;
pub use identity::{FederationVerifier, LocalIdentityProvider};
pub use profile::ProfileService;
