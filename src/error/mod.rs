//! Error types for Insurly.

pub mod unified;

pub use unified::{ErrorCategory, CONNECTIVITY_MESSAGE, GENERIC_API_MESSAGE, UNEXPECTED_MESSAGE};

use thiserror::Error;

/// Primary error type for all client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {}", .message.as_deref().unwrap_or("no message"))]
    Api {
        status: u16,
        /// Message supplied by the server in the response body, if any.
        message: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Token refresh failed: {0}")]
    RefreshFailed(#[source] Box<ClientError>),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: Some(message.into()),
        }
    }

    /// Build an API error from a non-success response body.
    ///
    /// The server message is taken from a top-level `message` field, or from
    /// `error.message` / a string `error` field when the backend nests it.
    pub fn from_response(status: u16, body: &str) -> Self {
        Self::Api {
            status,
            message: extract_server_message(body),
        }
    }

    /// HTTP status carried by this error, if it came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RefreshFailed(inner) => inner.status(),
            _ => None,
        }
    }

    /// Whether the backend rejected the access token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// Whether no response was received at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self.category(), ErrorCategory::Network | ErrorCategory::Timeout)
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RefreshFailed(inner) => match inner.category() {
                ErrorCategory::Network | ErrorCategory::Timeout => inner.category(),
                _ => ErrorCategory::Authentication,
            },
            Self::Network(err) if err.is_timeout() => ErrorCategory::Timeout,
            Self::Network(err) if err.is_decode() => ErrorCategory::Serialization,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) | Self::InvalidResponse(_) => ErrorCategory::Serialization,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
        }
    }

    /// Convert this error into a string fit for a toast.
    ///
    /// Server-provided messages win; failures without any response map to a
    /// fixed connectivity message; responses without a message fall back to
    /// a generic one. Pure and side-effect free.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Api { message: None, .. } => GENERIC_API_MESSAGE.to_string(),
            Self::RefreshFailed(inner) => inner.user_message(),
            other if other.is_connectivity() => CONNECTIVITY_MESSAGE.to_string(),
            _ => UNEXPECTED_MESSAGE.to_string(),
        }
    }
}

fn extract_server_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let message = value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .or_else(|| value.get("error").filter(|e| e.is_string()))?
        .as_str()?
        .trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ClientError>;
