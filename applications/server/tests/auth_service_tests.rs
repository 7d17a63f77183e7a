/// Account and identity provider tests
/// Tests sign-up, sign-in, profile repair and federated linking
mod common;

use common::{assertion, assertion_with, create_test_app, create_test_app_with, fixtures, TestApp};
use healthshare_core::{
    types::wire::{SignInRequest, SignUpRequest},
    HealthShareError, IdentityProvider, Role, UserId,
};
use healthshare_server::ServerError;

fn sign_up_request(name: &str, email: &str) -> SignUpRequest {
    SignUpRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: fixtures::PASSWORD.to_string(),
    }
}

fn sign_in_request(email: &str, password: &str) -> SignInRequest {
    SignInRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

fn domain_error(err: ServerError) -> HealthShareError {
    match err {
        ServerError::Domain(e) => e,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

async fn profile_of(app: &TestApp, uid: &UserId) -> Option<healthshare_core::UserProfile> {
    app.state
        .profile_service
        .read(Some(uid.as_str()))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_password_hashes_are_salted() {
    let app = create_test_app().await;
    let auth = &app.state.auth_service;

    let hash = auth.hash_password("MySecurePassword123!").await.unwrap();
    assert!(hash.starts_with("$2b$") || hash.starts_with("$2a$"));

    let hash2 = auth.hash_password("MySecurePassword123!").await.unwrap();
    assert_ne!(hash, hash2, "Hashes should differ due to random salt");
}

#[tokio::test]
async fn test_sign_up_provisions_profile() {
    let app = create_test_app().await;

    let session = app
        .state
        .account_service
        .sign_up(&sign_up_request("  Alice  ", "Alice@Example.com"))
        .await
        .unwrap();
    assert_eq!(session.name, "Alice");
    assert_eq!(session.role, Role::User);
    assert_eq!(
        app.state.auth_service.verify_id_token(&session.id_token).unwrap(),
        session.uid
    );

    let profile = profile_of(&app, &session.uid).await.expect("profile provisioned");
    assert_eq!(profile.email, "alice@example.com");
    assert_eq!(profile.name, "Alice");
}

#[tokio::test]
async fn test_sign_up_duplicate_email() {
    let app = create_test_app().await;
    let accounts = &app.state.account_service;

    accounts
        .sign_up(&sign_up_request("Alice", "alice@example.com"))
        .await
        .unwrap();
    let err = accounts
        .sign_up(&sign_up_request("Alice", "ALICE@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(domain_error(err), HealthShareError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_sign_in_repairs_missing_profile() {
    let app = create_test_app().await;

    // Identity without a profile, as left behind by an interrupted sign-up
    let identity = app
        .state
        .identity_provider
        .create_identity("orphan@example.com", fixtures::PASSWORD, "Orphan")
        .await
        .unwrap();
    assert!(profile_of(&app, &identity.uid).await.is_none());

    let session = app
        .state
        .account_service
        .sign_in(&sign_in_request("orphan@example.com", fixtures::PASSWORD))
        .await
        .unwrap();
    assert_eq!(session.uid, identity.uid);
    assert_eq!(session.name, "Orphan");

    let profile = profile_of(&app, &identity.uid).await.expect("profile repaired");
    assert_eq!(profile.email, "orphan@example.com");
    assert!(profile.last_login_at.is_some());
}

#[tokio::test]
async fn test_sign_in_keeps_edited_profile() {
    let app = create_test_app().await;
    let accounts = &app.state.account_service;

    let session = accounts
        .sign_up(&sign_up_request("Alice", "alice@example.com"))
        .await
        .unwrap();
    app.state
        .profile_service
        .write(
            Some(session.uid.as_str()),
            healthshare_core::ProfileUpdate::default()
                .name("Alice Cooper")
                .role("manager"),
        )
        .await
        .unwrap();

    let session = accounts
        .sign_in(&sign_in_request("alice@example.com", fixtures::PASSWORD))
        .await
        .unwrap();
    assert_eq!(session.name, "Alice Cooper");
    assert_eq!(session.role, Role::Manager);
}

#[tokio::test]
async fn test_sign_in_errors() {
    let app = create_test_app().await;
    let accounts = &app.state.account_service;
    accounts
        .sign_up(&sign_up_request("Alice", "alice@example.com"))
        .await
        .unwrap();

    let err = accounts
        .sign_in(&sign_in_request("alice@example.com", "wrong-password"))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), HealthShareError::BadCredential));

    let err = accounts
        .sign_in(&sign_in_request("nobody@example.com", fixtures::PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), HealthShareError::IdentityNotFound(_)));

    let err = accounts
        .sign_in(&sign_in_request("not-an-email", fixtures::PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), HealthShareError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_federated_sign_in_creates_then_reuses_identity() {
    let app = create_test_app().await;
    let accounts = &app.state.account_service;
    let token = assertion("broker|42", "fed@example.com", true, Some("Fed"));

    let first = accounts.federated_sign_in(&token).await.unwrap();
    let second = accounts.federated_sign_in(&token).await.unwrap();

    assert_eq!(first.uid, second.uid);
    assert_eq!(first.name, "Fed");

    // Federated-only identities have no password
    let err = accounts
        .sign_in(&sign_in_request("fed@example.com", fixtures::PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), HealthShareError::BadCredential));
}

#[tokio::test]
async fn test_federated_sign_in_links_verified_email() {
    let app = create_test_app().await;
    let accounts = &app.state.account_service;

    let local = accounts
        .sign_up(&sign_up_request("Alice", "alice@example.com"))
        .await
        .unwrap();

    let federated = accounts
        .federated_sign_in(&assertion("broker|7", "Alice@example.com", true, None))
        .await
        .unwrap();
    assert_eq!(federated.uid, local.uid);

    // Password sign-in still works after linking
    accounts
        .sign_in(&sign_in_request("alice@example.com", fixtures::PASSWORD))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_federated_sign_in_refuses_unverified_email_match() {
    let app = create_test_app().await;
    let accounts = &app.state.account_service;

    accounts
        .sign_up(&sign_up_request("Alice", "alice@example.com"))
        .await
        .unwrap();

    let err = accounts
        .federated_sign_in(&assertion("broker|8", "alice@example.com", false, None))
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), HealthShareError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_federated_sign_in_without_name_uses_email_local_part() {
    let app = create_test_app().await;

    let session = app
        .state
        .account_service
        .federated_sign_in(&assertion("broker|9", "carol@example.com", true, None))
        .await
        .unwrap();
    assert_eq!(session.name, "carol");
}

#[tokio::test]
async fn test_federated_assertion_checks() {
    let app = create_test_app().await;
    let provider = &app.state.identity_provider;

    let wrong_issuer = assertion_with(
        fixtures::BROKER_SECRET,
        "someone-else",
        "broker|1",
        "a@example.com",
        true,
        None,
    );
    let err = provider.federated_sign_in(&wrong_issuer).await.unwrap_err();
    assert!(matches!(err, HealthShareError::BadCredential));

    let err = provider.federated_sign_in("garbage").await.unwrap_err();
    assert!(matches!(err, HealthShareError::BadCredential));

    let err = app
        .state
        .account_service
        .federated_sign_in("  ")
        .await
        .unwrap_err();
    assert!(matches!(domain_error(err), HealthShareError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_federation_unconfigured() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let app = create_test_app_with(temp_dir, |config| {
        config.auth.federation_secret = None;
    })
    .await;

    let err = app
        .state
        .identity_provider
        .federated_sign_in(&assertion("broker|1", "a@example.com", true, None))
        .await
        .unwrap_err();
    assert!(matches!(err, HealthShareError::IdentityUnavailable(_)));
}

#[tokio::test]
async fn test_get_identity() {
    let app = create_test_app().await;
    let provider = &app.state.identity_provider;

    let identity = provider
        .create_identity("bob@example.com", fixtures::PASSWORD, "Bob")
        .await
        .unwrap();

    let found = provider.get_identity(&identity.uid).await.unwrap();
    assert_eq!(found, Some(identity));
    assert!(provider
        .get_identity(&UserId::new("missing"))
        .await
        .unwrap()
        .is_none());

    assert_eq!(provider.list_identities().await.unwrap().len(), 1);
}
