use std::sync::Arc;

use muni_client::config::ClientConfig;
use muni_client::navigator::RecordingNavigator;
use muni_client::storage::{
    MemoryStorage, Storage, AUTH_TOKEN_KEY, CHAT_MESSAGES_KEY, CHAT_SESSION_KEY, CHAT_USER_KEY,
    LEGACY_TOKEN_KEY,
};
use muni_client::{ClientError, Route, SessionManager};
use muni_common::models::auth::{LoginType, RegisterRequest, Role};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ─── Test helpers ───────────────────────────────────────────────────────

struct Harness {
    session: SessionManager,
    storage: Arc<MemoryStorage>,
    nav: Arc<RecordingNavigator>,
}

fn harness(server: &MockServer) -> Harness {
    let config = ClientConfig {
        base_url: server.uri(),
        ..Default::default()
    };
    let storage = Arc::new(MemoryStorage::new());
    let nav = Arc::new(RecordingNavigator::new());
    let session = SessionManager::new(&config, storage.clone(), nav.clone()).unwrap();
    Harness {
        session,
        storage,
        nav,
    }
}

fn user_json(role: &str) -> serde_json::Value {
    json!({
        "id": 42,
        "email": "vecina@muni.cl",
        "nombre": "María Soto",
        "rut": "12.345.678-5",
        "role": role
    })
}

// ─── Login / logout ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_token_and_clears_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token"))
        .and(body_partial_json(json!({"identifier": "vecina@muni.cl", "login_type": "email"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-1", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.storage.set(CHAT_SESSION_KEY, "old-chat").unwrap();
    h.storage.set(CHAT_MESSAGES_KEY, "[]").unwrap();

    let resp = h
        .session
        .login(" vecina@muni.cl ", "secreto", LoginType::Email)
        .await
        .unwrap();

    assert_eq!(resp.access_token, "tok-1");
    assert_eq!(h.session.token().as_deref(), Some("tok-1"));
    assert!(h.session.is_authenticated());
    assert_eq!(h.storage.get(CHAT_SESSION_KEY).unwrap(), None);
    assert_eq!(h.storage.get(CHAT_MESSAGES_KEY).unwrap(), None);
}

#[tokio::test]
async fn test_rut_login_sends_formatted_rut() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token"))
        .and(body_partial_json(json!({"identifier": "12.345.678-5", "login_type": "rut"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok-r"})))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.session
        .login("123456785", "secreto", LoginType::Rut)
        .await
        .unwrap();
    assert_eq!(h.session.token().as_deref(), Some("tok-r"));
}

#[tokio::test]
async fn test_failed_login_keeps_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Credenciales inválidas"})),
        )
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h
        .session
        .login("vecina@muni.cl", "mala", LoginType::Email)
        .await
        .unwrap_err();

    match err {
        ClientError::Unauthorized { detail } => {
            assert_eq!(detail.as_deref(), Some("Credenciales inválidas"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!h.session.is_authenticated());
    // No token was sent, so there is no session to tear down
    assert!(h.nav.visits().is_empty());
}

#[tokio::test]
async fn test_empty_access_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": ""})))
        .mount(&server)
        .await;

    let h = harness(&server);
    let err = h
        .session
        .login("vecina@muni.cl", "secreto", LoginType::Email)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let server = MockServer::start().await;
    let h = harness(&server);
    h.storage.set(AUTH_TOKEN_KEY, "tok-1").unwrap();
    h.storage.set(LEGACY_TOKEN_KEY, "tok-0").unwrap();
    h.storage.set(CHAT_SESSION_KEY, "chat-1").unwrap();

    h.session.logout().unwrap();
    h.session.logout().unwrap();

    assert!(!h.session.is_authenticated());
    assert_eq!(h.storage.get(LEGACY_TOKEN_KEY).unwrap(), None);
    assert_eq!(h.storage.get(CHAT_SESSION_KEY).unwrap(), None);
    assert_eq!(h.nav.visits(), vec![Route::Login, Route::Login]);
}

#[tokio::test]
async fn test_empty_stored_token_is_not_authenticated() {
    let server = MockServer::start().await;
    let h = harness(&server);
    h.storage.set(AUTH_TOKEN_KEY, "").unwrap();
    assert!(!h.session.is_authenticated());
    assert_eq!(h.session.token(), None);
}

// ─── Request funnel ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_logs_in_and_clears_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_partial_json(json!({"email": "nuevo@muni.cl", "rut": "11.111.111-1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok-new", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.storage.set(CHAT_SESSION_KEY, "previous-user-chat").unwrap();
    h.storage.set(CHAT_MESSAGES_KEY, "[{\"role\":\"user\"}]").unwrap();
    h.storage.set(CHAT_USER_KEY, "7").unwrap();

    let req = RegisterRequest {
        email: "nuevo@muni.cl".into(),
        nombre: "Nuevo Vecino".into(),
        rut: "11.111.111-1".into(),
        password: "secreto".into(),
        telefono: None,
        direccion: None,
    };
    let resp = h.session.register(&req).await.unwrap();

    assert_eq!(resp.access_token, "tok-new");
    assert_eq!(h.storage.get(AUTH_TOKEN_KEY).unwrap().as_deref(), Some("tok-new"));
    assert!(h.session.is_authenticated());
    assert_eq!(h.storage.get(CHAT_SESSION_KEY).unwrap(), None);
    assert_eq!(h.storage.get(CHAT_MESSAGES_KEY).unwrap(), None);
    assert_eq!(h.storage.get(CHAT_USER_KEY).unwrap(), None);
    assert!(h.nav.visits().is_empty());
}

#[tokio::test]
async fn test_bearer_token_attached_when_logged_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("admin")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server);
    h.storage.set(AUTH_TOKEN_KEY, "tok-1").unwrap();

    let user = h.session.current_user().await.unwrap();
    assert_eq!(user.id, 42);
    assert_eq!(user.role, Role::Admin);
}

#[tokio::test]
async fn test_unrecognised_role_still_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("inspector")))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.storage.set(AUTH_TOKEN_KEY, "tok-1").unwrap();

    let user = h.session.current_user().await.unwrap();
    assert_eq!(user.role, Role::Other);
    assert!(!user.is_staff());
    assert!(h.session.is_authenticated());
}

#[tokio::test]
async fn test_no_authorization_header_when_logged_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/reservations/tipos-tramites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let h = harness(&server);
    let _: serde_json::Value = h
        .session
        .get_json("/api/reservations/tipos-tramites")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expirado"})))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.storage.set(AUTH_TOKEN_KEY, "tok-1").unwrap();
    h.storage.set(LEGACY_TOKEN_KEY, "tok-1").unwrap();

    let err = h.session.current_user().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!h.session.is_authenticated());
    assert_eq!(h.storage.get(LEGACY_TOKEN_KEY).unwrap(), None);
    assert_eq!(h.nav.visits(), vec![Route::Login]);
}

#[tokio::test]
async fn test_concurrent_unauthorized_navigates_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/reservations/reservations"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents/my-documents"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let h = harness(&server);
    h.storage.set(AUTH_TOKEN_KEY, "tok-1").unwrap();

    let (a, b, c) = tokio::join!(
        h.session.current_user(),
        h.session
            .get_json::<serde_json::Value>("/api/reservations/reservations"),
        h.session
            .get_json::<serde_json::Value>("/api/documents/my-documents"),
    );

    assert!(a.unwrap_err().is_unauthorized());
    assert!(b.unwrap_err().is_unauthorized());
    assert!(c.unwrap_err().is_unauthorized());
    assert!(!h.session.is_authenticated());
    assert_eq!(h.nav.count(Route::Login), 1);
}

#[tokio::test]
async fn test_validation_and_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "El RUT ya está registrado"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/auth/users/me"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let h = harness(&server);
    let req = RegisterRequest {
        email: "nuevo@muni.cl".into(),
        nombre: "Nuevo Vecino".into(),
        rut: "11.111.111-1".into(),
        password: "secreto".into(),
        telefono: None,
        direccion: None,
    };
    let err = h.session.register(&req).await.unwrap_err();
    assert_eq!(err.user_message(), "El RUT ya está registrado");

    h.storage.set(AUTH_TOKEN_KEY, "tok-1").unwrap();
    let err = h.session.current_user().await.unwrap_err();
    assert!(err.is_network_failure());
    // 5xx leaves the session alone
    assert!(h.session.is_authenticated());
}
