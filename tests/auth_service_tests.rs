mod support;

use insurly::auth::{CredentialStore, Tokens};
use insurly::services::{LoginRequest, RegisterRequest};
use insurly::types::ProfileUpdate;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{
    bearer, mock_user, mount_refresh_success, signed_in_app, signed_out_app, ACCESS_TOKEN,
    REFRESH_TOKEN,
};

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"userName": "test@example.com", "password": "password"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": mock_user(),
            "accessToken": ACCESS_TOKEN,
            "refreshToken": REFRESH_TOKEN
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_persists_session_and_authorizes_later_calls() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("authorization", bearer(ACCESS_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_user()))
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = signed_out_app(&server);
    let session = app
        .auth()
        .login(&LoginRequest::new("test@example.com", "password"))
        .await
        .expect("login");

    assert_eq!(session.user.id, "1");
    assert_eq!(session.tokens, Tokens::new(ACCESS_TOKEN, REFRESH_TOKEN));
    assert_eq!(store.read().unwrap(), Some(session.tokens.clone()));
    let state = app.auth_state().snapshot();
    assert!(state.is_authenticated);
    assert!(!state.is_loading);
    assert_eq!(state.user.as_ref().map(|u| u.full_name()), Some("John Doe".into()));

    let user = app.auth().current_user().await.expect("profile");
    assert_eq!(user.email, "test@example.com");
}

#[tokio::test]
async fn invalid_credentials_fail_without_refresh() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_refresh_success(&server, 0).await;

    let (app, store) = signed_out_app(&server);
    let err = app
        .auth()
        .login(&LoginRequest::new("test@example.com", "wrong"))
        .await
        .expect_err("bad password");

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Invalid credentials");
    assert_eq!(store.read().unwrap(), None);
    assert!(!app.auth_state().is_authenticated());
    assert!(!app.loading().is_any_loading());
}

#[tokio::test]
async fn login_prefers_access_token_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("token", "header-access-token")
                .set_body_json(json!({
                    "user": mock_user(),
                    "accessToken": ACCESS_TOKEN,
                    "refreshToken": REFRESH_TOKEN
                })),
        )
        .mount(&server)
        .await;

    let (app, store) = signed_out_app(&server);
    let session = app
        .auth()
        .login(&LoginRequest::new("test@example.com", "password"))
        .await
        .expect("login");

    assert_eq!(session.tokens.access_token, "header-access-token");
    assert_eq!(store.read().unwrap().unwrap().access_token, "header-access-token");
}

#[tokio::test]
async fn login_without_any_access_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": mock_user(),
            "refreshToken": REFRESH_TOKEN
        })))
        .mount(&server)
        .await;

    let (app, store) = signed_out_app(&server);
    let err = app
        .auth()
        .login(&LoginRequest::new("test@example.com", "password"))
        .await
        .expect_err("no access token");

    assert!(matches!(err, insurly::error::ClientError::InvalidResponse(_)));
    assert_eq!(store.read().unwrap(), None);
    assert!(!app.auth_state().is_authenticated());
}

#[tokio::test]
async fn register_signs_new_user_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(json!({
            "email": "new@example.com",
            "password": "secret",
            "name": "New User"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": "2", "email": "new@example.com", "firstName": "New", "lastName": "User"},
            "accessToken": ACCESS_TOKEN,
            "refreshToken": REFRESH_TOKEN
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = signed_out_app(&server);
    let session = app
        .auth()
        .register(&RegisterRequest::new("new@example.com", "secret").with_name("New User"))
        .await
        .expect("register");

    assert_eq!(session.user.id, "2");
    assert!(store.read().unwrap().is_some());
    assert_eq!(app.auth_state().user().map(|u| u.id), Some("2".to_string()));
}

#[tokio::test]
async fn logout_clears_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .and(header("authorization", bearer(ACCESS_TOKEN).as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Logged out successfully"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = signed_in_app(&server);
    assert!(app.auth_state().is_authenticated());
    app.auth().logout().await.expect("logout");

    assert_eq!(store.read().unwrap(), None);
    assert!(!app.auth_state().is_authenticated());
}

#[tokio::test]
async fn logout_clears_session_even_when_backend_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let (app, store) = signed_in_app(&server);
    let err = app.auth().logout().await.expect_err("backend failure surfaces");

    assert_eq!(err.status(), Some(503));
    assert_eq!(store.read().unwrap(), None);
    assert!(!app.auth_state().is_authenticated());
}

#[tokio::test]
async fn update_profile_sends_only_changed_fields() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .and(body_json(json!({"firstName": "Jane"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "1",
            "email": "test@example.com",
            "firstName": "Jane",
            "lastName": "Doe"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _store) = signed_in_app(&server);
    let update = ProfileUpdate {
        first_name: Some("Jane".into()),
        ..ProfileUpdate::default()
    };
    let user = app.auth().update_profile(&update).await.expect("update");

    assert_eq!(user.full_name(), "Jane Doe");
    assert_eq!(app.auth_state().user(), Some(user));
}

#[tokio::test]
async fn empty_profile_update_fetches_profile_without_put() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/auth/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_user()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mock_user()))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _store) = signed_in_app(&server);
    let user = app
        .auth()
        .update_profile(&ProfileUpdate::default())
        .await
        .expect("no-op update");

    assert_eq!(user.full_name(), "John Doe");
    assert_eq!(app.auth_state().user(), Some(user));
}
