//! In-memory authentication state mirrored from the credential store.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::store::CredentialStore;
use super::token::Tokens;
use crate::types::User;

/// Point-in-time view of the session.
///
/// `is_authenticated` always equals `tokens.is_some()`, and `user` is never
/// set without tokens. `user` may still be `None` while authenticated, for
/// example right after hydrating from storage and before a profile fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub tokens: Option<Tokens>,
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl AuthState {
    /// State at process start: nothing known yet, hydration pending.
    pub fn initial() -> Self {
        Self {
            user: None,
            tokens: None,
            is_authenticated: false,
            is_loading: true,
        }
    }

    fn signed_out() -> Self {
        Self {
            is_loading: false,
            ..Self::initial()
        }
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Process-wide authentication state service.
///
/// Wraps a [`CredentialStore`] and publishes every transition on a `watch`
/// channel so UI code can react to sign-in and sign-out. All methods take
/// `&self`; share the store behind an `Arc`.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use insurly::auth::{AuthStore, MemoryCredentialStore};
///
/// let auth = AuthStore::new(Arc::new(MemoryCredentialStore::new()));
/// auth.load_stored_auth();
/// assert!(!auth.is_authenticated());
/// assert!(!auth.snapshot().is_loading);
/// ```
pub struct AuthStore {
    credentials: Arc<dyn CredentialStore>,
    state_tx: watch::Sender<AuthState>,
}

impl AuthStore {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        let (state_tx, _) = watch::channel(AuthState::initial());
        Self {
            credentials,
            state_tx,
        }
    }

    /// Current state.
    pub fn snapshot(&self) -> AuthState {
        self.state_tx.borrow().clone()
    }

    /// Subscribe to state changes.
    ///
    /// Callers can `.changed().await` on the receiver to be woken on every
    /// transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state_tx.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state_tx.borrow().is_authenticated
    }

    pub fn user(&self) -> Option<User> {
        self.state_tx.borrow().user.clone()
    }

    /// The credential store backing this state.
    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Hydrate from the credential store at app start.
    ///
    /// Never fails: a read error is logged and treated as signed out.
    pub fn load_stored_auth(&self) {
        let tokens = match self.credentials.read() {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(error = %err, "Failed to load stored credentials");
                None
            }
        };
        let found = tokens.is_some();
        self.state_tx.send_modify(|state| {
            state.is_authenticated = found;
            state.is_loading = false;
            if found {
                state.tokens = tokens;
            } else {
                state.tokens = None;
                state.user = None;
            }
        });
        debug!(authenticated = found, "Hydrated auth state from storage");
    }

    /// Persist `tokens` and mark the session authenticated as `user`.
    ///
    /// The state only flips once the write succeeded; a storage failure is
    /// returned and the previous state is kept.
    pub fn set_auth(&self, user: User, tokens: Tokens) -> Result<(), AuthError> {
        self.credentials.store(&tokens)?;
        info!(user_id = %user.id, "Signed in");
        self.state_tx.send_replace(AuthState {
            user: Some(user),
            tokens: Some(tokens),
            is_authenticated: true,
            is_loading: false,
        });
        Ok(())
    }

    /// Remove persisted tokens and sign out.
    ///
    /// The in-memory state is reset even when removing the stored pair
    /// fails; that failure is still returned.
    pub fn clear_auth(&self) -> Result<(), AuthError> {
        let result = self.credentials.clear();
        if let Err(err) = &result {
            warn!(error = %err, "Failed to remove stored credentials");
        }
        self.state_tx.send_replace(AuthState::signed_out());
        info!("Signed out");
        result
    }

    /// Persist a refreshed pair and update the cached copy. `user` is kept.
    pub fn update_tokens(&self, tokens: Tokens) -> Result<(), AuthError> {
        self.credentials.store(&tokens)?;
        self.state_tx.send_modify(|state| {
            state.tokens = Some(tokens);
            state.is_authenticated = true;
        });
        debug!("Cached refreshed tokens");
        Ok(())
    }

    /// Record a fetched profile. Ignored (returns `false`) when signed out.
    pub fn set_user(&self, user: User) -> bool {
        self.state_tx.send_if_modified(|state| {
            if state.tokens.is_none() {
                return false;
            }
            if state.user.as_ref() == Some(&user) {
                return false;
            }
            state.user = Some(user);
            true
        });
        self.state_tx.borrow().tokens.is_some()
    }
}
