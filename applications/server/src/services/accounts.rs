/// Account service - sign-up and sign-in flows
use crate::error::Result;
use crate::services::{AuthService, ProfileService};
use healthshare_core::{
    types::wire::{SessionResponse, SignInRequest, SignUpRequest},
    validation, Identity, IdentityProvider,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AccountService {
    identity_provider: Arc<dyn IdentityProvider>,
    profiles: ProfileService,
    auth_service: Arc<AuthService>,
}

impl AccountService {
    pub fn new(
        identity_provider: Arc<dyn IdentityProvider>,
        profiles: ProfileService,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            identity_provider,
            profiles,
            auth_service,
        }
    }

    /// Register a new email/password identity and provision its profile
    pub async fn sign_up(&self, req: &SignUpRequest) -> Result<SessionResponse> {
        validation::validate_sign_up(&req.name, &req.email, &req.password)?;

        let identity = self
            .identity_provider
            .create_identity(&req.email, &req.password, req.name.trim())
            .await?;

        self.open_session(identity).await
    }

    pub async fn sign_in(&self, req: &SignInRequest) -> Result<SessionResponse> {
        validation::validate_sign_in(&req.email, &req.password)?;

        let identity = self
            .identity_provider
            .verify_identity(&req.email, &req.password)
            .await?;

        self.open_session(identity).await
    }

    pub async fn federated_sign_in(&self, assertion: &str) -> Result<SessionResponse> {
        if assertion.trim().is_empty() {
            return Err(crate::error::ServerError::bad_request("assertion is required"));
        }

        let identity = self.identity_provider.federated_sign_in(assertion).await?;
        self.open_session(identity).await
    }

    /// Provision (or repair) the profile, stamp the sign-in and issue a token
    async fn open_session(&self, identity: Identity) -> Result<SessionResponse> {
        let provisioned = self
            .profiles
            .provision(&identity.uid, &identity.display_name, &identity.email)
            .await?;

        let profile = self
            .profiles
            .record_sign_in(&identity.uid)
            .await?
            .unwrap_or(provisioned.profile);

        let id_token = self.auth_service.create_id_token(&identity.uid)?;

        tracing::info!(uid = %identity.uid, "Signed in");

        Ok(SessionResponse {
            uid: identity.uid,
            id_token,
            name: profile.name,
            email: profile.email,
            role: profile.role,
            expires_in: self.auth_service.expires_in(),
        })
    }
}
