//! Authentication Models
//!
//! Data structures for authentication requests, responses, and the identity bound to a request.

use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::auth::jwt::Claims;
use crate::database::models::UserDto;

/// Authenticated user information extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub email: String,
    pub user_id: i64,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            user_id: claims.user_id,
        }
    }
}

/// Outcome of request authentication, stored in the request extensions.
///
/// `Anonymous` keeps the reason so logs can tell a missing header from an
/// expired or forged token; the request outcome is the same either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Authenticated(AuthUser),
    Anonymous(AuthError),
}

impl Identity {
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Anonymous(_) => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }
}

/// Login request payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Token response after successful authentication
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    /// Token lifetime in milliseconds
    pub expires_in: i64,
    pub user: UserDto,
}

impl TokenResponse {
    pub fn new(token: String, expires_in: i64, user: UserDto) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}
