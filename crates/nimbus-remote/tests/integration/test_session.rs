//! Integration tests for login, session validation and persistence

use nimbus_remote::session::{create_session, AuthError, Credentials, Session};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbus_remote::client::NimbusClient;

async fn mount_login(server: &MockServer, status: u16, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "me@example.com", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"token": token})))
        .mount(server)
        .await;
}

fn password_credentials() -> Credentials {
    Credentials {
        email: Some("me@example.com".to_string()),
        password: Some("hunter2".to_string()),
        session_file: None,
    }
}

#[tokio::test]
async fn test_password_login_saves_default_session_file() {
    let server = MockServer::start().await;
    mount_login(&server, 200, "fresh-token").await;

    let dir = tempfile::tempdir().unwrap();
    let default_file = dir.path().join(".nimbus");
    let mut client = NimbusClient::new(server.uri(), "");

    let session = create_session(&mut client, "www.amazon.com", &password_credentials(), &default_file)
        .await
        .expect("login failed");

    assert_eq!(session.token, "fresh-token");
    assert_eq!(session.email.as_deref(), Some("me@example.com"));

    // Later requests carry the new token
    Mock::given(method("GET"))
        .and(path("/account"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "me@example.com"})))
        .mount(&server)
        .await;
    client.get_account().await.expect("token was not applied");
    assert_eq!(Session::load_from_file(&default_file).unwrap(), session);
}

#[tokio::test]
async fn test_password_login_rejected() {
    let server = MockServer::start().await;
    mount_login(&server, 401, "").await;

    let dir = tempfile::tempdir().unwrap();
    let default_file = dir.path().join(".nimbus");
    let mut client = NimbusClient::new(server.uri(), "");

    let err = create_session(&mut client, "d", &password_credentials(), &default_file)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::LoginFailed(ref e) if e.is_auth_failure()));
    assert!(!default_file.exists());
}

#[tokio::test]
async fn test_saved_session_is_validated_and_rewritten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .and(header("authorization", "Bearer saved-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "me@example.com"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    let saved = Session::new("www.amazon.com", Some("me@example.com".into()), "saved-token");
    saved.save_to_file(&session_file).unwrap();

    let credentials = Credentials {
        session_file: Some(session_file.clone()),
        ..Default::default()
    };
    let mut client = NimbusClient::new(server.uri(), "");
    let session = create_session(
        &mut client,
        "www.amazon.com",
        &credentials,
        &dir.path().join("unused"),
    )
    .await
    .expect("session validation failed");

    assert_eq!(session, saved);
    assert!(session_file.exists());
    assert!(!dir.path().join("unused").exists());
}

#[tokio::test]
async fn test_expired_session_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    Session::new("d", None, "stale").save_to_file(&session_file).unwrap();

    let credentials = Credentials {
        session_file: Some(session_file),
        ..Default::default()
    };
    let mut client = NimbusClient::new(server.uri(), "");
    let err = create_session(&mut client, "d", &credentials, dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidSession(_)));
}

#[tokio::test]
async fn test_unreadable_session_falls_back_to_password() {
    let server = MockServer::start().await;
    mount_login(&server, 200, "new-token").await;

    let dir = tempfile::tempdir().unwrap();
    let session_file = dir.path().join("session.json");
    std::fs::write(&session_file, "garbage").unwrap();

    let credentials = Credentials {
        session_file: Some(session_file.clone()),
        ..password_credentials()
    };
    let mut client = NimbusClient::new(server.uri(), "");
    let session = create_session(&mut client, "d", &credentials, &dir.path().join("unused"))
        .await
        .expect("password login should succeed");

    assert_eq!(session.token, "new-token");
    assert_eq!(Session::load_from_file(&session_file).unwrap().token, "new-token");
}

#[tokio::test]
async fn test_missing_credentials_make_no_requests() {
    let server = MockServer::start().await;
    let mut client = NimbusClient::new(server.uri(), "");

    let err = create_session(
        &mut client,
        "d",
        &Credentials::default(),
        std::path::Path::new("/tmp/unused"),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AuthError::MissingCredentials));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
