//! Client configuration.

use std::time::Duration;

/// Default bound on every profile request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for connecting to a HealthShare server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the server (e.g., "https://health.example.com")
    pub url: String,
    /// ID token of the signed-in user, if any
    pub id_token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id_token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a config with an existing ID token.
    pub fn with_token(url: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            id_token: Some(id_token.into()),
            ..Self::new(url)
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
