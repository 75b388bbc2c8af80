use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::Tokens;
use crate::client::{ApiClient, ApiResponse, RequestConfig};
use crate::error::{ClientError, Result};
use crate::types::{ProfileUpdate, User};

/// Response header some backends use to deliver the access token on login.
pub const ACCESS_TOKEN_HEADER: &str = "token";

/// Credentials for `POST /login`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_name", &self.user_name)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Payload for `POST /register`.
#[derive(Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl RegisterRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .finish()
    }
}

/// Signed-in user and the issued token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: User,
    pub tokens: Tokens,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    user: User,
    #[serde(default)]
    access_token: Option<String>,
    refresh_token: String,
}

/// Sign-in, sign-out and profile endpoints.
///
/// Successful login and registration persist the session through the
/// client's [`AuthStore`](crate::auth::AuthStore).
pub struct AuthService {
    client: Arc<ApiClient>,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// `POST /login`. A 401 here means bad credentials and is returned
    /// without attempting a token refresh.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        let config = RequestConfig::post("/login").with_json(request)?.without_refresh();
        let response = self.client.send(config).await?;
        self.establish_session(&response)
    }

    /// `POST /register`, signing the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session> {
        let config = RequestConfig::post("/register").with_json(request)?.without_refresh();
        let response = self.client.send(config).await?;
        self.establish_session(&response)
    }

    /// `POST /auth/logout`. The local session is cleared whether or not the
    /// backend call succeeds; the call's outcome is still returned.
    pub async fn logout(&self) -> Result<()> {
        let result = self.client.send(RequestConfig::post("/auth/logout")).await;
        if let Err(err) = &result {
            warn!(error = %err, "Logout request failed; clearing local session anyway");
        }
        self.client.auth().clear_auth()?;
        result.map(|_| ())
    }

    /// `GET /profile`, recording the user in the auth state.
    pub async fn current_user(&self) -> Result<User> {
        let user: User = self.client.get_json("/profile").await?;
        self.client.auth().set_user(user.clone());
        Ok(user)
    }

    /// `PUT /auth/profile` with only the fields being changed.
    ///
    /// An update that changes nothing sends no `PUT`; the current profile is
    /// fetched instead.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        if update.is_empty() {
            debug!("Empty profile update; fetching current profile");
            return self.current_user().await;
        }
        let config = RequestConfig::put("/auth/profile").with_json(update)?;
        let user: User = self.client.send_json(config).await?;
        self.client.auth().set_user(user.clone());
        Ok(user)
    }

    fn establish_session(&self, response: &ApiResponse) -> Result<Session> {
        let body: AuthResponse = response.json()?;
        let access_token = resolve_access_token(response.header(ACCESS_TOKEN_HEADER), body.access_token)?;
        let tokens = Tokens::new(access_token, body.refresh_token);
        self.client.auth().set_auth(body.user.clone(), tokens.clone())?;
        info!(user_id = %body.user.id, "Session established");
        Ok(Session {
            user: body.user,
            tokens,
        })
    }
}

/// Pick the access token from a login response.
///
/// A non-empty `token` header takes precedence over the body field.
pub fn resolve_access_token(header: Option<&str>, body: Option<String>) -> Result<String> {
    if let Some(token) = header.map(str::trim).filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    body.filter(|t| !t.is_empty()).ok_or_else(|| {
        ClientError::InvalidResponse("login response carried no access token".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_token_wins_over_body() {
        let token = resolve_access_token(Some("header-token"), Some("body-token".into())).unwrap();
        assert_eq!(token, "header-token");
    }

    #[test]
    fn body_token_used_when_header_missing_or_blank() {
        assert_eq!(
            resolve_access_token(None, Some("body-token".into())).unwrap(),
            "body-token"
        );
        assert_eq!(
            resolve_access_token(Some("  "), Some("body-token".into())).unwrap(),
            "body-token"
        );
    }

    #[test]
    fn missing_token_everywhere_is_invalid_response() {
        assert!(matches!(
            resolve_access_token(None, None),
            Err(ClientError::InvalidResponse(_))
        ));
        assert!(matches!(
            resolve_access_token(None, Some(String::new())),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[test]
    fn login_request_uses_backend_field_names() {
        let body = serde_json::to_value(LoginRequest::new("test@example.com", "password")).unwrap();
        assert_eq!(body, json!({"userName": "test@example.com", "password": "password"}));
    }

    #[test]
    fn register_request_omits_missing_name() {
        let body = serde_json::to_value(RegisterRequest {
            email: "new@example.com".into(),
            password: "pw".into(),
            name: None,
        })
        .unwrap();
        assert_eq!(body, json!({"email": "new@example.com", "password": "pw"}));
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", LoginRequest::new("a@b.c", "hunter2"));
        assert!(!rendered.contains("hunter2"));
    }
}
