//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use chrono::{Duration, Utc};
use healthshare_server::{config::ServerConfig, create_router, state::AppState};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub mod fixtures {
    pub const JWT_SECRET: &str = "test-secret-key";
    pub const BROKER_SECRET: &str = "test-broker-secret";
    pub const BROKER_ISSUER: &str = "test-broker";
    pub const COOKIE_NAME: &str = "healthshare-auth-token";
    pub const PASSWORD: &str = "password123";
    pub const INDEX_HTML: &str = "<html><body>HealthShare</body></html>";
}

/// Router plus the state and database behind it
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

pub fn test_config(temp_dir: &TempDir) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.storage.database_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
    config.auth.jwt_secret = fixtures::JWT_SECRET.to_string();
    config.auth.bcrypt_cost = 4;
    config.auth.federation_secret = Some(fixtures::BROKER_SECRET.to_string());
    config.auth.federation_issuer = fixtures::BROKER_ISSUER.to_string();
    config.web.dir = temp_dir.path().join("web");
    config
}

/// Create the full application against a fresh file-backed database
pub async fn create_test_app() -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    create_test_app_with(temp_dir, |_| {}).await
}

pub async fn create_test_app_with(
    temp_dir: TempDir,
    customize: impl FnOnce(&mut ServerConfig),
) -> TestApp {
    let mut config = test_config(&temp_dir);
    customize(&mut config);
    config.validate().expect("valid test config");

    std::fs::create_dir_all(&config.web.dir).expect("Failed to create web dir");
    std::fs::write(config.web.dir.join("index.html"), fixtures::INDEX_HTML)
        .expect("Failed to write index.html");

    let pool = healthshare_storage::create_pool(&config.storage.database_url)
        .await
        .expect("Failed to create pool");
    healthshare_storage::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::build(&config, pool.clone()).expect("Failed to build state");
    let router = create_router(state.clone(), &config.web.dir);

    TestApp {
        router,
        state,
        pool,
        _temp_dir: temp_dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Register an account through the API and return `(uid, id_token)`
    pub async fn sign_up(&self, name: &str, email: &str) -> (String, String) {
        let body = json!({ "name": name, "email": email, "password": fixtures::PASSWORD });
        let response = self
            .send(json_request(Method::POST, "/api/auth/sign-up", Some(body), None))
            .await;
        assert_eq!(response.status(), 201, "sign-up failed");

        let session = body_json(response).await;
        (
            session["uid"].as_str().unwrap().to_string(),
            session["idToken"].as_str().unwrap().to_string(),
        )
    }

    /// Promote a user to admin directly through the service
    pub async fn make_admin(&self, uid: &str) {
        self.state
            .profile_service
            .write(
                Some(uid),
                healthshare_core::ProfileUpdate::default().role("admin"),
            )
            .await
            .expect("Failed to promote user");
    }
}

pub fn json_request(
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn page_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(value) = cookie {
        builder = builder.header(header::COOKIE, format!("{}={value}", fixtures::COOKIE_NAME));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Sign a broker assertion with the given secret and issuer
pub fn assertion_with(
    secret: &str,
    issuer: &str,
    sub: &str,
    email: &str,
    email_verified: bool,
    name: Option<&str>,
) -> String {
    let claims = json!({
        "sub": sub,
        "email": email,
        "email_verified": email_verified,
        "name": name,
        "iss": issuer,
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Assertion signed by the configured test broker
pub fn assertion(sub: &str, email: &str, email_verified: bool, name: Option<&str>) -> String {
    assertion_with(
        fixtures::BROKER_SECRET,
        fixtures::BROKER_ISSUER,
        sub,
        email,
        email_verified,
        name,
    )
}
