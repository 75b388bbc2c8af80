//! Token refresh call, issued outside the request pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::transport_error;
use crate::auth::Tokens;
use crate::error::{ClientError, Result};

pub const REFRESH_PATH: &str = "/auth/refresh";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Exchange `refresh_token` for a new pair.
///
/// Sends no `Authorization` header and is neither tracked nor retried. When
/// the backend does not rotate the refresh token the old one is kept.
pub(crate) async fn refresh_tokens(
    http: &reqwest::Client,
    base_url: &str,
    refresh_token: &str,
    timeout: Duration,
) -> Result<Tokens> {
    let url = format!("{base_url}{REFRESH_PATH}");
    debug!(url = %url, "Refreshing access token");

    let response = http
        .post(&url)
        .timeout(timeout)
        .json(&RefreshRequest { refresh_token })
        .send()
        .await
        .map_err(|e| transport_error(e, timeout))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, timeout))?;
    if !status.is_success() {
        return Err(ClientError::from_response(status.as_u16(), &body));
    }

    let payload: RefreshResponse = serde_json::from_str(&body)?;
    if payload.access_token.is_empty() {
        return Err(ClientError::InvalidResponse(
            "refresh response has an empty access token".into(),
        ));
    }
    let refresh_token = payload
        .refresh_token
        .filter(|token| !token.is_empty())
        .unwrap_or_else(|| refresh_token.to_string());
    Ok(Tokens::new(payload.access_token, refresh_token))
}
