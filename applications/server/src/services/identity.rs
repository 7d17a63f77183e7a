//! Local identity provider backed by the `identities` table.
//!
//! Email/password identities are hashed with bcrypt. Federated identities
//! arrive as HS256 assertions signed by an upstream broker that shares a
//! secret with this server.

use crate::services::AuthService;
use async_trait::async_trait;
use healthshare_core::{
    normalize_email, HealthShareError, Identity, IdentityProvider, Result, UserId,
};
use healthshare_storage::identities::{self, IdentityRecord};
use healthshare_storage::StorageError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Claims carried by a broker assertion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FederatedClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: Option<String>,
    pub iss: String,
    pub exp: i64,
}

/// Verifies assertions issued by the identity broker
#[derive(Clone)]
pub struct FederationVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl FederationVerifier {
    pub fn new(secret: &str, issuer: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, assertion: &str) -> Result<FederatedClaims> {
        let data = decode::<FederatedClaims>(assertion, &self.key, &self.validation).map_err(|e| {
            tracing::warn!("Federated assertion rejected: {}", e);
            HealthShareError::BadCredential
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() || claims.email.trim().is_empty() {
            tracing::warn!("Federated assertion missing subject or email");
            return Err(HealthShareError::BadCredential);
        }
        Ok(claims)
    }
}

pub struct LocalIdentityProvider {
    pool: SqlitePool,
    auth_service: Arc<AuthService>,
    federation: Option<FederationVerifier>,
}

impl LocalIdentityProvider {
    pub fn new(
        pool: SqlitePool,
        auth_service: Arc<AuthService>,
        federation: Option<FederationVerifier>,
    ) -> Self {
        Self {
            pool,
            auth_service,
            federation,
        }
    }

    /// All identities ordered by email
    pub async fn list_identities(&self) -> Result<Vec<Identity>> {
        let records = identities::get_all(&self.pool)
            .await
            .map_err(unavailable)?;
        Ok(records.into_iter().map(to_identity).collect())
    }

    async fn create_record(
        &self,
        email: &str,
        display_name: &str,
        password_hash: Option<&str>,
        federated_subject: Option<&str>,
    ) -> Result<IdentityRecord> {
        let uid = UserId::generate();
        identities::create(
            &self.pool,
            uid.as_str(),
            email,
            display_name,
            password_hash,
            federated_subject,
        )
        .await
        .map_err(|e| match e {
            StorageError::Duplicate(_) => HealthShareError::AlreadyExists(email.to_string()),
            other => unavailable(other),
        })
    }
}

fn unavailable(err: StorageError) -> HealthShareError {
    HealthShareError::identity_unavailable(err.to_string())
}

fn to_identity(record: IdentityRecord) -> Identity {
    Identity {
        uid: UserId::new(record.uid),
        email: record.email,
        display_name: record.display_name,
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Identity> {
        let email = normalize_email(email);
        let hash = self
            .auth_service
            .hash_password(password)
            .await
            .map_err(|e| HealthShareError::identity_unavailable(e.to_string()))?;

        let record = self
            .create_record(&email, display_name.trim(), Some(&hash), None)
            .await?;

        tracing::info!(uid = %record.uid, "Identity created");
        Ok(to_identity(record))
    }

    async fn verify_identity(&self, email: &str, password: &str) -> Result<Identity> {
        let email = normalize_email(email);
        let record = identities::get_by_email(&self.pool, &email)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| HealthShareError::IdentityNotFound(email.clone()))?;

        // Federated-only identities have no password to check
        let Some(hash) = record.password_hash.as_deref() else {
            return Err(HealthShareError::BadCredential);
        };

        let valid = self
            .auth_service
            .verify_password(password, hash)
            .await
            .map_err(|e| HealthShareError::identity_unavailable(e.to_string()))?;

        if !valid {
            tracing::warn!(uid = %record.uid, "Password rejected");
            return Err(HealthShareError::BadCredential);
        }

        Ok(to_identity(record))
    }

    async fn federated_sign_in(&self, assertion: &str) -> Result<Identity> {
        let verifier = self.federation.as_ref().ok_or_else(|| {
            HealthShareError::identity_unavailable("federated sign-in is not configured")
        })?;
        let claims = verifier.verify(assertion)?;

        if let Some(record) = identities::get_by_federated_subject(&self.pool, &claims.sub)
            .await
            .map_err(unavailable)?
        {
            return Ok(to_identity(record));
        }

        let email = normalize_email(&claims.email);
        if let Some(existing) = identities::get_by_email(&self.pool, &email)
            .await
            .map_err(unavailable)?
        {
            if !claims.email_verified {
                tracing::warn!(uid = %existing.uid, "Unverified federated email matches an account");
                return Err(HealthShareError::AlreadyExists(email));
            }
            let linked = identities::link_federated_subject(&self.pool, &existing.uid, &claims.sub)
                .await
                .map_err(unavailable)?;
            if !linked {
                // Account is already tied to a different broker subject
                return Err(HealthShareError::AlreadyExists(email));
            }
            tracing::info!(uid = %existing.uid, "Federated subject linked");
            return Ok(to_identity(existing));
        }

        let display_name = claims
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());

        match self
            .create_record(&email, &display_name, None, Some(&claims.sub))
            .await
        {
            Ok(record) => {
                tracing::info!(uid = %record.uid, "Federated identity created");
                Ok(to_identity(record))
            }
            // A concurrent first sign-in for the same subject won the insert
            Err(HealthShareError::AlreadyExists(email)) => {
                identities::get_by_federated_subject(&self.pool, &claims.sub)
                    .await
                    .map_err(unavailable)?
                    .map(to_identity)
                    .ok_or(HealthShareError::AlreadyExists(email))
            }
            Err(e) => Err(e),
        }
    }

    async fn get_identity(&self, uid: &UserId) -> Result<Option<Identity>> {
        let record = identities::get_by_uid(&self.pool, uid.as_str())
            .await
            .map_err(unavailable)?;
        Ok(record.map(to_identity))
    }
}
