//! Token validation: signature through the codec, then expiry against a caller-supplied clock.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::error::AuthError;
use crate::auth::jwt::{Claims, JwtService};
use crate::auth::models::AuthUser;

#[derive(Clone)]
pub struct TokenValidator {
    codec: Arc<JwtService>,
}

impl TokenValidator {
    pub fn new(codec: Arc<JwtService>) -> Self {
        Self { codec }
    }

    /// Decode and require `now < exp`. An expired token is rejected even when
    /// its signature is correct.
    pub fn check(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let claims = self.codec.decode(token)?;
        // `exp` is whole seconds (issue time truncated), so a token issued at a
        // fractional second expires up to one second before `issued + lifetime`.
        if now.timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }

    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> bool {
        self.check(token, now).is_ok()
    }

    /// Subject and user id of a valid token. Re-validates, so calling it on a
    /// bad token yields the same error `check` would.
    pub fn claims(&self, token: &str, now: DateTime<Utc>) -> Result<AuthUser, AuthError> {
        self.check(token, now).map(AuthUser::from)
    }
}
