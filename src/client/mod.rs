//! Authenticated HTTP client with loading tracking and token refresh.

pub mod refresh;
pub mod request;
pub mod response;

pub use request::RequestConfig;
pub use response::ApiResponse;

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::auth::{AuthStore, Tokens};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::loading::RequestTracker;
use refresh::refresh_tokens;

/// HTTP client for the Insurly backend.
///
/// Every call made through [`send`](Self::send):
/// - is tracked in the [`RequestTracker`] for its whole lifetime, retry
///   included, and released on every exit path (the future being dropped
///   counts);
/// - carries `Authorization: Bearer <access>` read fresh from the
///   credential store, so a call issued after another call's refresh picks
///   up the new token;
/// - on a 401, refreshes the token pair once and retries once. A 401 on the
///   retry is returned as-is. A missing refresh token or a failed refresh
///   signs the user out.
///
/// Refreshes are serialized. A call that waited on another call's refresh
/// retries with the rotated token instead of refreshing again.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    auth: Arc<AuthStore>,
    tracker: Arc<RequestTracker>,
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    pub fn new(
        config: &ClientConfig,
        auth: Arc<AuthStore>,
        tracker: Arc<RequestTracker>,
    ) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url().to_string(),
            timeout: config.timeout(),
            auth,
            tracker,
            refresh_lock: Mutex::new(()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    pub fn tracker(&self) -> &Arc<RequestTracker> {
        &self.tracker
    }

    /// Run one logical call through the pipeline.
    pub async fn send(&self, request: RequestConfig) -> Result<ApiResponse> {
        let key = request.request_key();
        let _loading = self.tracker.track(key.clone());
        let call_id = Uuid::new_v4();
        debug!(
            %call_id,
            method = %request.method,
            path = %request.path,
            key = %key,
            "Dispatching request"
        );

        let sent_with = self.stored_tokens()?;
        let err = match self.dispatch(&request, sent_with.as_ref(), call_id).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };
        if !(err.is_unauthorized() && request.refresh_on_unauthorized) {
            return Err(err);
        }

        // The one permitted retry; whatever it returns is final.
        let tokens = self.recover_session(sent_with.as_ref(), err).await?;
        debug!(%call_id, key = %key, "Retrying request with refreshed token");
        self.dispatch(&request, Some(&tokens), call_id).await
    }

    /// Send `request` and decode the JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestConfig) -> Result<T> {
        self.send(request).await?.json()
    }

    /// `GET path` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(RequestConfig::get(path)).await
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn stored_tokens(&self) -> Result<Option<Tokens>> {
        self.auth.credentials().read().map_err(|err| {
            warn!(error = %err, "Failed to read stored credentials before dispatch");
            ClientError::from(err)
        })
    }

    async fn dispatch(
        &self,
        request: &RequestConfig,
        tokens: Option<&Tokens>,
        call_id: Uuid,
    ) -> Result<ApiResponse> {
        let timeout = request.timeout.unwrap_or(self.timeout);
        let mut headers = request.headers.clone();
        if let Some(tokens) = tokens {
            let mut value = HeaderValue::from_str(&tokens.bearer()).map_err(|_| {
                ClientError::Authentication("stored access token is not a valid header value".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = self
            .http
            .request(request.method.clone(), self.url(&request.path))
            .timeout(timeout)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        if status.is_success() {
            debug!(%call_id, status = status.as_u16(), "Request succeeded");
            return Ok(ApiResponse::new(status, headers, body));
        }
        let err = ClientError::from_response(status.as_u16(), &body);
        debug!(%call_id, status = status.as_u16(), error = %err, "Request failed");
        Err(err)
    }

    /// Obtain a usable token pair after a 401, or end the session.
    async fn recover_session(
        &self,
        sent_with: Option<&Tokens>,
        original: ClientError,
    ) -> Result<Tokens> {
        let _refreshing = self.refresh_lock.lock().await;

        let stored = match self.auth.credentials().read() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "Failed to read stored credentials for refresh");
                None
            }
        };
        let Some(stored) = stored else {
            warn!("No refresh token available; signing out");
            self.end_session();
            return Err(original);
        };

        if sent_with.map_or(true, |sent| sent.access_token != stored.access_token) {
            debug!("Stored token changed since dispatch; retrying without refresh");
            return Ok(stored);
        }

        let refreshed =
            match refresh_tokens(&self.http, &self.base_url, &stored.refresh_token, self.timeout)
                .await
            {
                Ok(tokens) => tokens,
                Err(err) => {
                    warn!(error = %err, category = %err.category(), "Token refresh failed; signing out");
                    self.end_session();
                    return Err(ClientError::RefreshFailed(Box::new(err)));
                }
            };

        if let Err(err) = self.auth.update_tokens(refreshed.clone()) {
            warn!(error = %err, "Failed to persist refreshed tokens; signing out");
            self.end_session();
            return Err(ClientError::RefreshFailed(Box::new(err.into())));
        }
        info!("Access token refreshed");
        Ok(refreshed)
    }

    fn end_session(&self) {
        // clear_auth logs its own storage failure and always resets state.
        let _ = self.auth.clear_auth();
    }
}

/// Map a failure that produced no response.
pub(crate) fn transport_error(error: reqwest::Error, timeout: Duration) -> ClientError {
    if error.is_timeout() {
        ClientError::Timeout(timeout.as_millis() as u64)
    } else {
        ClientError::Network(error)
    }
}
