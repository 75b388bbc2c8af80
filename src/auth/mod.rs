//! Token storage and authentication state.

pub mod error;
pub mod state;
pub mod store;
pub mod token;

pub use error::AuthError;
pub use state::{AuthState, AuthStore};
pub use store::{CredentialStore, CredentialStoreConfig, FileCredentialStore, MemoryCredentialStore};
pub use token::Tokens;
