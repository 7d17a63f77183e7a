//! HealthShare Client
//!
//! HTTP client for the HealthShare server API plus the profile view state
//! machine that drives a profile screen.
//!
//! # Features
//!
//! - **Accounts**: sign-up, sign-in, federated sign-in, sign-out
//! - **Profiles**: read, merge-write and list, authenticated with the ID token
//! - **Profile view**: load/edit/save flow with timeouts and teardown
//!
//! # Example
//!
//! ```ignore
//! use healthshare_client::{ClientConfig, HealthShareClient, ProfileView};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HealthShareClient::new(ClientConfig::new("https://health.example.com"))?;
//!     let session = client.sign_in("alice@example.com", "password").await?;
//!
//!     let view = ProfileView::new(Arc::new(client));
//!     view.mount(Some(session.uid)).await?;
//!     view.begin_edit().await?;
//!     view.edit(|draft| draft.bio = "Hello".to_string()).await?;
//!     view.submit().await?;
//!
//!     Ok(())
//! }
//! ```

mod api;
mod client;
mod error;
mod types;
mod view;

pub use api::ProfileApi;
pub use client::HealthShareClient;
pub use error::{ClientError, Result};
pub use types::{ClientConfig, DEFAULT_TIMEOUT};
pub use view::{ProfileDraft, ProfileView, TeardownHandle, ViewState};
