#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use insurly::auth::{AuthError, CredentialStore, MemoryCredentialStore, Tokens};
use insurly::config::ClientConfig;
use insurly::Insurly;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "mock-access-token-123";
pub const REFRESH_TOKEN: &str = "mock-refresh-token-456";
pub const NEW_ACCESS_TOKEN: &str = "new-mock-access-token-789";
pub const NEW_REFRESH_TOKEN: &str = "new-mock-refresh-token-012";

pub fn mock_user() -> Value {
    json!({
        "id": "1",
        "email": "test@example.com",
        "firstName": "John",
        "lastName": "Doe"
    })
}

pub fn mock_insurances() -> Value {
    json!([
        {"insuranceId": "1", "name": "car insurance", "insuredSum": 100000},
        {"insuranceId": "2", "name": "medical insurance", "insuredSum": 200000}
    ])
}

pub fn mock_claims() -> Value {
    json!([
        {"insuranceId": "1", "claimedAmount": 1000},
        {"insuranceId": "2", "claimedAmount": 4000}
    ])
}

pub fn stored_tokens() -> Tokens {
    Tokens::new(ACCESS_TOKEN, REFRESH_TOKEN)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Wire the full stack against `server` over an in-memory store.
pub fn app_with_store(server: &MockServer, store: Arc<dyn CredentialStore>) -> Insurly {
    let config = ClientConfig::new(server.uri()).with_timeout(Duration::from_secs(5));
    Insurly::with_credential_store(config, store).expect("build client stack")
}

/// Stack with no stored session.
pub fn signed_out_app(server: &MockServer) -> (Insurly, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::new());
    let app = app_with_store(server, store.clone());
    app.auth_state().load_stored_auth();
    (app, store)
}

/// Stack restored from a stored `mock-access-token-123` session.
pub fn signed_in_app(server: &MockServer) -> (Insurly, Arc<MemoryCredentialStore>) {
    let store = Arc::new(MemoryCredentialStore::with_tokens(stored_tokens()));
    let app = app_with_store(server, store.clone());
    app.auth_state().load_stored_auth();
    (app, store)
}

/// `POST /auth/refresh` accepting the stored refresh token and rotating the pair.
pub async fn mount_refresh_success(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": REFRESH_TOKEN})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": NEW_ACCESS_TOKEN,
            "refreshToken": NEW_REFRESH_TOKEN
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

pub async fn mount_unauthorized(server: &MockServer, http_method: &str, route: &str) {
    Mock::given(method(http_method))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Unauthorized"})),
        )
        .mount(server)
        .await;
}

/// Store whose reads always fail.
pub struct UnreadableStore;

impl CredentialStore for UnreadableStore {
    fn store(&self, _tokens: &Tokens) -> Result<(), AuthError> {
        Ok(())
    }

    fn read(&self) -> Result<Option<Tokens>, AuthError> {
        Err(AuthError::Io("credential file unreadable".into()))
    }

    fn clear(&self) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Store that serves and clears its tokens but rejects every write.
pub struct ReadOnlyStore {
    tokens: Mutex<Option<Tokens>>,
}

impl ReadOnlyStore {
    pub fn with_tokens(tokens: Tokens) -> Self {
        Self {
            tokens: Mutex::new(Some(tokens)),
        }
    }
}

impl CredentialStore for ReadOnlyStore {
    fn store(&self, _tokens: &Tokens) -> Result<(), AuthError> {
        Err(AuthError::Io("disk full".into()))
    }

    fn read(&self) -> Result<Option<Tokens>, AuthError> {
        Ok(self.tokens.lock().expect("store lock poisoned").clone())
    }

    fn clear(&self) -> Result<(), AuthError> {
        self.tokens.lock().expect("store lock poisoned").take();
        Ok(())
    }
}
