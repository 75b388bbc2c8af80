//! Typed request functions for the backend endpoints.

pub mod auth;
pub mod insurance;

pub use auth::{AuthService, LoginRequest, RegisterRequest, Session};
pub use insurance::InsuranceService;
