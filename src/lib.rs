//! # Bearer Auth Server
//!
//! HTTP API with stateless bearer-token authentication, built with Axum and Tokio.
//!
//! ## Flow
//! 1. `POST /api/auth/login` checks the password (argon2) and returns an
//!    HS256-signed token.
//! 2. Clients send `Authorization: Bearer <token>` on later requests.
//! 3. [`auth::middleware::AuthMiddleware`] validates the token on every request
//!    and binds an [`auth::Identity`]; no session is stored server-side.
//! 4. [`auth::policy::AccessPolicy`] rejects requests to protected routes that
//!    carry no identity.
//!
//! ## Modules
//! - `auth`: token codec, validator, request authenticator, access policy, password verification
//! - `config`: environment configuration
//! - `database`: user models and storage
//! - `services`: registration and login
//! - `routes`: HTTP handlers
//! - `server`: application state, router and server loop

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod routes;
pub mod server;
pub mod services;

pub use config::Config;
pub use server::{build_router, AppState};
