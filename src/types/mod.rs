//! Domain types exchanged with the backend.

pub mod insurance;
pub mod user;

pub use insurance::{merge_claims, Claim, Insurance, InsuranceWithClaim};
pub use user::{ProfileUpdate, User};
