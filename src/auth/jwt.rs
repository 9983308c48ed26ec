//! JWT Token Service
//!
//! Issues and decodes HS256-signed compact tokens carrying the identity claim set.
//! Expiry is deliberately not checked here; see [`crate::auth::validator`].

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;
use crate::config::AuthConfig;

/// JWT Claims structure containing user information and token metadata
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User email
    pub sub: String,
    /// User numeric identifier
    #[serde(rename = "userId")]
    pub user_id: i64,
    /// Token issued at timestamp (seconds)
    pub iat: i64,
    /// Token expiration timestamp (seconds)
    pub exp: i64,
}

impl Claims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl JwtService {
    /// Create a new JWT service bound to the configured secret and lifetime
    pub fn new(config: &AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp", "iat"]);

        Self {
            encoding_key,
            decoding_key,
            validation,
            lifetime: config.token_lifetime(),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Generate a token for a user using the configured lifetime
    pub fn create_token(&self, email: &str, user_id: i64) -> Result<String, AuthError> {
        self.issue(email, user_id, Utc::now(), self.lifetime)
    }

    /// Sign a claim set with `iat = now` and `exp = now + lifetime`.
    pub fn issue(
        &self,
        subject: &str,
        user_id: i64,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<String, AuthError> {
        let expiration = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AuthError::Internal("token expiry is out of range".to_string()))?;

        let claims = Claims {
            sub: subject.to_string(),
            user_id,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(AuthError::from)
    }

    /// Verify the signature and decode the claim set. Does not look at `exp`.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        if token.split('.').count() != 3 {
            return Err(AuthError::Malformed);
        }

        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AuthError::from)
    }
}
