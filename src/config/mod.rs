//! Client configuration (layered: code > env > defaults).

use std::path::PathBuf;
use std::time::Duration;

use crate::auth::store::{CredentialStoreConfig, DEFAULT_SERVICE};
use crate::error::{ClientError, Result};

/// Backend used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Per-request deadline used when a request does not set its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub const ENV_BASE_URL: &str = "INSURLY_API_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "INSURLY_TIMEOUT_MS";
pub const ENV_CREDENTIAL_DIR: &str = "INSURLY_CREDENTIAL_DIR";

/// Settings for [`Insurly`](crate::Insurly) and [`ApiClient`](crate::client::ApiClient).
///
/// # Example
/// ```
/// use std::time::Duration;
/// use insurly::config::ClientConfig;
///
/// let config = ClientConfig::new("https://api.example.com/")
///     .with_timeout(Duration::from_secs(10));
/// assert_eq!(config.base_url(), "https://api.example.com");
/// config.validate()?;
/// # Ok::<(), insurly::error::ClientError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    timeout: Duration,
    credential_dir: PathBuf,
    credential_service: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            timeout: DEFAULT_TIMEOUT,
            credential_dir: CredentialStoreConfig::default_dir(),
            credential_service: DEFAULT_SERVICE.to_string(),
        }
    }

    /// Load from environment variables, reading `.env` if present.
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let mut config = Self::default();

        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            config = config.with_base_url(url);
        }
        if let Some(ms) = std::env::var(ENV_TIMEOUT_MS)
            .ok()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
        {
            config.timeout = Duration::from_millis(ms);
        }
        if let Ok(dir) = std::env::var(ENV_CREDENTIAL_DIR) {
            config.credential_dir = PathBuf::from(dir);
        }

        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credential_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.credential_dir = dir.into();
        self
    }

    pub fn with_credential_service(mut self, service: impl Into<String>) -> Self {
        self.credential_service = service.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn credential_dir(&self) -> &PathBuf {
        &self.credential_dir
    }

    /// Settings for the file-backed credential store.
    pub fn credential_store(&self) -> CredentialStoreConfig {
        CredentialStoreConfig::new(self.credential_dir.clone())
            .with_service(self.credential_service.clone())
    }

    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(ClientError::Configuration("base URL is empty".into()));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base URL must use http or https: {}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(ClientError::Configuration("timeout must be non-zero".into()));
        }
        Ok(())
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
