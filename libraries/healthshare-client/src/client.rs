//! HealthShare server client.

use crate::error::{ClientError, Result};
use crate::types::ClientConfig;
use healthshare_core::types::wire::{
    ErrorBody, FederatedSignInRequest, ProfileEnvelope, SessionResponse, SignInRequest,
    SignUpRequest, WriteProfileRequest, WriteProfileResponse,
};
use healthshare_core::{ProfileSummary, ProfileUpdate, UserId, UserProfile};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Client for the HealthShare account and profile API.
///
/// Holds the ID token of the signed-in user and attaches it to every
/// profile request. Requests are never retried automatically.
#[derive(Clone)]
pub struct HealthShareClient {
    http: Client,
    config: Arc<RwLock<ClientConfig>>,
}

fn map_send_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_connect() {
        ClientError::ServerUnreachable(e.to_string())
    } else {
        ClientError::Request(e)
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse {what}: {e}")))
}

/// Turn a non-success response into a `ClientError`
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.code, body.error),
        Err(_) => (String::new(), text),
    };

    if status == StatusCode::UNAUTHORIZED {
        warn!(status = %status, code = %code, "Request rejected: not authenticated");
        return ClientError::AuthFailed(message);
    }

    ClientError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

impl HealthShareClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        url::Url::parse(&url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("HealthShare/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(ClientConfig { url, ..config })),
        })
    }

    /// Get the server URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Check if the client holds an ID token.
    pub async fn is_authenticated(&self) -> bool {
        self.config.read().await.id_token.is_some()
    }

    /// Set the ID token directly (e.g., restored from storage).
    pub async fn set_token(&self, id_token: impl Into<String>) {
        self.config.write().await.id_token = Some(id_token.into());
    }

    pub async fn token(&self) -> Option<String> {
        self.config.read().await.id_token.clone()
    }

    async fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.read().await.url, path)
    }

    async fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token().await.ok_or(ClientError::AuthRequired)?;
        Ok(builder.bearer_auth(token))
    }

    async fn open_session<B: Serialize>(&self, path: &str, body: &B) -> Result<SessionResponse> {
        let url = self.endpoint(path).await;
        debug!(url = %url, "Opening session");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let session: SessionResponse = parse_json(response, "session").await?;
        self.config.write().await.id_token = Some(session.id_token.clone());

        info!(uid = %session.uid, "Signed in");
        Ok(session)
    }

    /// Register a new account. The returned ID token is stored.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<SessionResponse> {
        let request = SignUpRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.open_session("/api/auth/sign-up", &request).await
    }

    /// Sign in with email and password. The returned ID token is stored.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SessionResponse> {
        let request = SignInRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.open_session("/api/auth/sign-in", &request).await
    }

    /// Exchange a broker assertion for a session.
    pub async fn federated_sign_in(&self, assertion: &str) -> Result<SessionResponse> {
        let request = FederatedSignInRequest {
            assertion: assertion.to_string(),
        };
        self.open_session("/api/auth/federated", &request).await
    }

    /// Sign out and forget the stored token.
    ///
    /// The local token is cleared even if the server cannot be reached.
    pub async fn sign_out(&self) -> Result<()> {
        let url = self.endpoint("/api/auth/sign-out").await;
        self.config.write().await.id_token = None;

        let response = self.http.post(&url).send().await.map_err(map_send_error)?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        info!("Signed out");
        Ok(())
    }

    /// Fetch a profile. `Ok(None)` when the server has no profile for `uid`.
    pub async fn get_profile(&self, uid: &UserId) -> Result<Option<UserProfile>> {
        let url = self.endpoint("/api/profile").await;
        debug!(url = %url, uid = %uid, "Fetching profile");

        let request = self.http.get(&url).query(&[("uid", uid.as_str())]);
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(map_send_error)?;

        match response.status() {
            status if status.is_success() => {
                let envelope: ProfileEnvelope = parse_json(response, "profile").await?;
                Ok(envelope.user)
            }
            StatusCode::NOT_FOUND => {
                let text = response.text().await.unwrap_or_default();
                match serde_json::from_str::<ProfileEnvelope>(&text) {
                    Ok(envelope) => Ok(envelope.user),
                    Err(_) => Err(ClientError::Api {
                        status: StatusCode::NOT_FOUND.as_u16(),
                        code: "not_found".to_string(),
                        message: text,
                    }),
                }
            }
            _ => Err(error_from_response(response).await),
        }
    }

    /// Merge-write the supplied fields and return the stored record.
    pub async fn update_profile(&self, uid: &UserId, update: ProfileUpdate) -> Result<UserProfile> {
        let url = self.endpoint("/api/profile").await;
        debug!(url = %url, uid = %uid, "Updating profile");

        let body = WriteProfileRequest::new(uid, update);
        let request = self.http.post(&url).json(&body);
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let written: WriteProfileResponse = parse_json(response, "write response").await?;
        Ok(written.user)
    }

    /// List profile summaries.
    pub async fn list_profiles(&self) -> Result<Vec<ProfileSummary>> {
        let url = self.endpoint("/api/profiles").await;

        let request = self.http.get(&url);
        let response = self
            .authorized(request)
            .await?
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        parse_json(response, "profile list").await
    }
}
