mod common;

use std::sync::Arc;

use common::client_with;
use scholarstream::api::{LocalStorage, MemoryStorage, ACCESS_TOKEN_KEY, SESSION_KEY};
use scholarstream::auth::{AuthError, FirebaseIdentityProvider, IdentityProvider, ProfileUpdate, SessionContext};
use scholarstream::models::Role;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_sign_in(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "fb-key"))
        .and(body_partial_json(json!({ "email": "a@x.com", "returnSecureToken": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-42",
            "email": "a@x.com",
            "displayName": "Ada",
            "idToken": "id-token-1"
        })))
        .mount(server)
        .await;
}

async fn mock_jwt(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/jwt"))
        .and(body_partial_json(json!({ "email": "a@x.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "backend-jwt" })))
        .expect(1)
        .mount(server)
        .await;
}

fn identity(server: &MockServer) -> Arc<dyn IdentityProvider> {
    Arc::new(FirebaseIdentityProvider::new(&server.uri(), "fb-key"))
}

#[tokio::test]
async fn login_stores_token_and_role_and_survives_restart() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;
    mock_jwt(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/users/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "a@x.com", "role": "admin" })))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let mut ctx = SessionContext::new(client_with(&server, storage.clone()), identity(&server));

    let session = ctx.login("a@x.com", "hunter2").await.unwrap();
    assert_eq!(session.uid, "uid-42");
    assert_eq!(session.display_name.as_deref(), Some("Ada"));
    assert_eq!(session.role, Role::Admin);
    assert_eq!(storage.get(ACCESS_TOKEN_KEY).unwrap().as_deref(), Some("backend-jwt"));

    let restored = SessionContext::restore(client_with(&server, storage.clone()), identity(&server)).unwrap();
    assert_eq!(restored.current().map(|s| s.email.as_deref()), Some(Some("a@x.com")));
    assert_eq!(restored.role(), Role::Admin);
}

#[tokio::test]
async fn unknown_backend_user_defaults_to_student() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;
    mock_jwt(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/users/.+$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "user not found" })))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let mut ctx = SessionContext::new(client_with(&server, storage), identity(&server));
    assert_eq!(ctx.login("a@x.com", "pw").await.unwrap().role, Role::Student);
}

#[tokio::test]
async fn wrong_password_surfaces_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST")).and(path("/jwt")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

    let storage = Arc::new(MemoryStorage::new());
    let mut ctx = SessionContext::new(client_with(&server, storage.clone()), identity(&server));
    match ctx.login("a@x.com", "nope").await {
        Err(AuthError::Provider { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "INVALID_LOGIN_CREDENTIALS");
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(ctx.current().is_none());
    assert!(storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());
}

#[tokio::test]
async fn logout_clears_token_and_session() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;
    mock_jwt(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/users/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "a@x.com" })))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let mut ctx = SessionContext::new(client_with(&server, storage.clone()), identity(&server));
    ctx.login("a@x.com", "pw").await.unwrap();
    ctx.logout().await.unwrap();

    assert!(ctx.current().is_none());
    assert_eq!(ctx.role(), Role::Student);
    assert!(storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
}

#[tokio::test]
async fn profile_update_keeps_role_and_persists() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;
    mock_jwt(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/users/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "a@x.com", "role": "moderator" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .and(body_partial_json(json!({ "idToken": "id-token-1", "displayName": "Ada L." })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "localId": "uid-42",
            "email": "a@x.com",
            "displayName": "Ada L."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let mut ctx = SessionContext::new(client_with(&server, storage.clone()), identity(&server));
    ctx.login("a@x.com", "pw").await.unwrap();

    let update = ProfileUpdate { display_name: Some("Ada L.".into()), photo_url: None };
    let session = ctx.update_profile(update).await.unwrap();
    assert_eq!(session.display_name.as_deref(), Some("Ada L."));
    assert_eq!(session.role, Role::Moderator);
    assert_eq!(session.provider_token.as_deref(), Some("id-token-1"));

    let raw = storage.get(SESSION_KEY).unwrap().unwrap();
    assert!(raw.contains("Ada L."));
}

#[tokio::test]
async fn corrupt_stored_session_is_discarded() {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    storage.set(SESSION_KEY, "{not json").unwrap();

    let ctx = SessionContext::restore(client_with(&server, storage.clone()), identity(&server)).unwrap();
    assert!(ctx.current().is_none());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
}

#[tokio::test]
async fn profile_update_requires_sign_in() {
    let server = MockServer::start().await;
    let mut ctx = SessionContext::new(client_with(&server, Arc::new(MemoryStorage::new())), identity(&server));
    let err = ctx.update_profile(ProfileUpdate::default()).await.unwrap_err();
    assert!(matches!(err, AuthError::NotSignedIn));
}

#[tokio::test]
async fn failed_role_lookup_drops_the_token() {
    let server = MockServer::start().await;
    mock_sign_in(&server).await;
    mock_jwt(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/users/.+$"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "database down" })))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let mut ctx = SessionContext::new(client_with(&server, storage.clone()), identity(&server));

    assert!(matches!(ctx.login("a@x.com", "pw").await, Err(AuthError::Api(_))));
    assert!(ctx.current().is_none());
    assert!(storage.get(ACCESS_TOKEN_KEY).unwrap().is_none());
    assert!(storage.get(SESSION_KEY).unwrap().is_none());
}
