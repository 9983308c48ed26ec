//! # Authentication Module
//!
//! Stateless bearer-token authentication: token issuance and decoding, expiry
//! validation, the per-request authenticator, the route access policy and
//! password verification.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod policy;
pub mod validator;

pub use error::AuthError;
pub use models::{AuthUser, Identity};
