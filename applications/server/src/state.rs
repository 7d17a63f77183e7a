/// Shared application state
use crate::config::ServerConfig;
use crate::error::Result;
use crate::services::{
    AccountService, AuthService, FederationVerifier, LocalIdentityProvider, ProfileService,
};
use healthshare_core::SessionGuard;
use healthshare_storage::SqliteProfileStore;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Auth cookie settings
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    pub secure: bool,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
    pub account_service: AccountService,
    pub identity_provider: Arc<LocalIdentityProvider>,
    pub auth_service: Arc<AuthService>,
    pub cookie: Arc<CookieSettings>,
    pub guard: Arc<SessionGuard>,
}

impl AppState {
    /// Wire every backend client once from configuration
    pub fn build(config: &ServerConfig, pool: SqlitePool) -> Result<Self> {
        let auth_service = Arc::new(AuthService::new(
            config.auth.jwt_secret.clone(),
            config.auth.id_token_expiration_hours,
            config.auth.bcrypt_cost,
        ));

        let federation = config
            .auth
            .federation_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|secret| FederationVerifier::new(secret, &config.auth.federation_issuer));

        let identity_provider = Arc::new(LocalIdentityProvider::new(
            pool.clone(),
            Arc::clone(&auth_service),
            federation,
        ));

        let profile_service = ProfileService::new(Arc::new(SqliteProfileStore::new(pool)));

        let account_service = AccountService::new(
            identity_provider.clone(),
            profile_service.clone(),
            Arc::clone(&auth_service),
        );

        Ok(Self {
            profile_service,
            account_service,
            identity_provider,
            auth_service,
            cookie: Arc::new(CookieSettings {
                name: config.auth.cookie_name.clone(),
                secure: config.auth.cookie_secure,
            }),
            guard: Arc::new(config.session_guard()?),
        })
    }
}
