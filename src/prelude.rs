//! Convenience re-exports for common use.

pub use crate::auth::{AuthState, AuthStore, CredentialStore, Tokens};
pub use crate::client::{ApiClient, ApiResponse, RequestConfig};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, Result};
pub use crate::loading::RequestTracker;
pub use crate::notify::{report_error, Notification, Notifier};
pub use crate::services::{AuthService, InsuranceService, LoginRequest, RegisterRequest, Session};
pub use crate::types::{Claim, Insurance, InsuranceWithClaim, ProfileUpdate, User};
pub use crate::Insurly;
