//! Insurly: authenticated API client core for the Insurly insurance app.
//!
//! Provides the pieces the app's UI layer builds on: a credential store,
//! an observable authentication state, an in-flight request tracker for
//! loading indicators, and an HTTP client that attaches bearer tokens and
//! transparently refreshes an expired access token once per call.
//!
//! # Quick Start
//!
//! ```no_run
//! use insurly::prelude::*;
//!
//! # async fn example() -> insurly::error::Result<()> {
//! let app = Insurly::new(ClientConfig::from_env())?;
//! app.auth_state().load_stored_auth();
//!
//! if !app.auth_state().is_authenticated() {
//!     app.auth().login(&LoginRequest::new("test@example.com", "password")).await?;
//! }
//! for policy in app.insurance().insurances_with_claims().await? {
//!     println!("{}: {}", policy.insurance.name, policy.remaining_sum);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod loading;
pub mod notify;
pub mod prelude;
pub mod services;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;

use std::sync::Arc;

use auth::{AuthStore, CredentialStore, FileCredentialStore};
use client::ApiClient;
use config::ClientConfig;
use loading::RequestTracker;
use services::{AuthService, InsuranceService};

/// The wired-up client stack.
///
/// Owns one credential store, auth state, request tracker and API client,
/// and hands out the typed services built on them. Create it once at app
/// start and share it.
pub struct Insurly {
    client: Arc<ApiClient>,
    auth: AuthService,
    insurance: InsuranceService,
}

impl Insurly {
    /// Build the stack over a file-backed credential store.
    pub fn new(config: ClientConfig) -> error::Result<Self> {
        let store = Arc::new(FileCredentialStore::new(config.credential_store()));
        Self::with_credential_store(config, store)
    }

    /// Build the stack over a caller-supplied credential store.
    pub fn with_credential_store(
        config: ClientConfig,
        store: Arc<dyn CredentialStore>,
    ) -> error::Result<Self> {
        let auth_state = Arc::new(AuthStore::new(store));
        let tracker = Arc::new(RequestTracker::new());
        let client = Arc::new(ApiClient::new(&config, auth_state, tracker)?);
        Ok(Self {
            auth: AuthService::new(Arc::clone(&client)),
            insurance: InsuranceService::new(Arc::clone(&client)),
            client,
        })
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn auth_state(&self) -> &Arc<AuthStore> {
        self.client.auth()
    }

    pub fn loading(&self) -> &Arc<RequestTracker> {
        self.client.tracker()
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn insurance(&self) -> &InsuranceService {
        &self.insurance
    }
}
