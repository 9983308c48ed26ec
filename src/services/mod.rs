//! # Services Module
//!
//! Account registration and login, sitting between the HTTP handlers and the
//! authentication core.

pub mod auth;

pub use auth::AuthService;
