/// Authentication service - ID tokens and password hashing
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use healthshare_core::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    id_token_expiration: Duration,
    bcrypt_cost: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (uid)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

impl AuthService {
    pub fn new(secret: String, id_token_expiration_hours: u64, bcrypt_cost: u32) -> Self {
        Self {
            secret,
            id_token_expiration: Duration::hours(id_token_expiration_hours as i64),
            bcrypt_cost,
        }
    }

    /// Token lifetime in seconds, as reported to clients
    pub fn expires_in(&self) -> u64 {
        self.id_token_expiration.num_seconds().max(0) as u64
    }

    /// Hash a password using bcrypt on the blocking pool
    pub async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| ServerError::Internal(format!("hashing task failed: {e}")))?
            .map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let password = password.to_string();
        let hash = hash.to_string();
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| ServerError::Internal(format!("verification task failed: {e}")))?
            .map_err(ServerError::from)
    }

    /// Issue an ID token for a signed-in user
    pub fn create_id_token(&self, uid: &UserId) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.id_token_expiration;

        let claims = Claims {
            sub: uid.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }

    /// Verify and decode an ID token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify an ID token and return the uid it was issued for
    pub fn verify_id_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        UserId::parse(&claims.sub)
            .ok_or_else(|| ServerError::Auth("Token has no subject".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AuthService {
        AuthService::new("secret".to_string(), 24, 4)
    }

    #[tokio::test]
    async fn test_password_hashing() {
        let auth = auth();
        let password = "my_secure_password";

        let hash = auth.hash_password(password).await.unwrap();
        assert!(auth.verify_password(password, &hash).await.unwrap());
        assert!(!auth.verify_password("wrong_password", &hash).await.unwrap());
    }

    #[test]
    fn test_id_token_round_trip() {
        let auth = auth();
        let uid = UserId::new("user-123");

        let token = auth.create_id_token(&uid).unwrap();
        assert_eq!(auth.verify_id_token(&token).unwrap(), uid);
        assert_eq!(auth.expires_in(), 24 * 3600);
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = AuthService::new("other".to_string(), 24, 4);
        let token = other.create_id_token(&UserId::new("user-123")).unwrap();

        assert!(auth().verify_id_token(&token).is_err());
        assert!(auth().verify_id_token("not-a-jwt").is_err());
    }
}
