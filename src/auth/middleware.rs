//! Authentication Middleware
//!
//! Axum middleware that turns an optional `Authorization: Bearer` header into
//! an [`Identity`] on the request. It never rejects a request for carrying a
//! bad or missing token; that decision belongs to the access policy.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::auth::{
    error::AuthError,
    models::{AuthUser, Identity},
    validator::TokenValidator,
};
use crate::error::ApiError;

const BEARER_PREFIX: &str = "Bearer ";

/// Authentication middleware that validates bearer tokens and injects the identity
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Resolve the request's identity and always hand the request on.
    pub async fn authenticate(
        State(validator): State<Arc<TokenValidator>>,
        mut req: Request,
        next: Next,
    ) -> Response {
        let identity = Self::resolve(&validator, req.headers(), Utc::now());

        match &identity {
            Identity::Authenticated(user) => {
                tracing::debug!("[AuthMiddleware] Token validated for {} (id={})", user.email, user.user_id);
            }
            Identity::Anonymous(AuthError::MissingCredential) => {
                tracing::debug!("[AuthMiddleware] No bearer credential on {} {}", req.method(), req.uri().path());
            }
            Identity::Anonymous(AuthError::Internal(reason)) => {
                tracing::error!("[AuthMiddleware] Token verification failed internally: {}", reason);
                return ApiError::Internal.into_response();
            }
            Identity::Anonymous(reason) => {
                tracing::warn!(
                    "[AuthMiddleware] Rejected bearer token on {} {}: {}",
                    req.method(),
                    req.uri().path(),
                    reason
                );
            }
        }

        req.extensions_mut().insert(identity);
        next.run(req).await
    }

    /// Pure part of the middleware: header map and clock in, identity out.
    pub fn resolve(validator: &TokenValidator, headers: &HeaderMap, now: DateTime<Utc>) -> Identity {
        let Some(token) = bearer_token(headers) else {
            return Identity::Anonymous(AuthError::MissingCredential);
        };

        match validator.claims(token, now) {
            Ok(user) => Identity::Authenticated(user),
            Err(e) => Identity::Anonymous(e),
        }
    }
}

/// Token from `Authorization: Bearer <token>`, if the header has that shape.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Identity bound by [`AuthMiddleware::authenticate`]; anonymous when the
/// middleware did not run.
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<Identity>()
            .cloned()
            .unwrap_or(Identity::Anonymous(AuthError::MissingCredential)))
    }
}

/// Handler argument that requires an authenticated identity.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .and_then(Identity::user)
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtService;
    use crate::config::AuthConfig;
    use axum::http::HeaderValue;
    use chrono::Duration;

    fn setup() -> (Arc<JwtService>, TokenValidator) {
        let config = AuthConfig::new("middleware-secret-0123456789abcdefghij", 3_600_000).unwrap();
        let codec = Arc::new(JwtService::new(&config));
        (codec.clone(), TokenValidator::new(codec))
    }

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("bearer abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer    ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn no_header_is_missing_credential() {
        let (_, validator) = setup();
        assert_eq!(
            AuthMiddleware::resolve(&validator, &HeaderMap::new(), Utc::now()),
            Identity::Anonymous(AuthError::MissingCredential)
        );
        assert_eq!(
            AuthMiddleware::resolve(&validator, &headers("Token abc"), Utc::now()),
            Identity::Anonymous(AuthError::MissingCredential)
        );
    }

    #[test]
    fn valid_token_binds_identity() {
        let (codec, validator) = setup();
        let now = Utc::now();
        let token = codec.issue("joao@example.com", 1, now, Duration::hours(1)).unwrap();

        let identity = AuthMiddleware::resolve(&validator, &headers(&format!("Bearer {token}")), now);
        assert_eq!(
            identity,
            Identity::Authenticated(AuthUser {
                email: "joao@example.com".into(),
                user_id: 1
            })
        );
    }

    #[test]
    fn failures_keep_their_reason() {
        let (codec, validator) = setup();
        let now = Utc::now();
        let expired = codec
            .issue("joao@example.com", 1, now - Duration::hours(2), Duration::hours(1))
            .unwrap();

        assert_eq!(
            AuthMiddleware::resolve(&validator, &headers(&format!("Bearer {expired}")), now),
            Identity::Anonymous(AuthError::Expired)
        );
        assert_eq!(
            AuthMiddleware::resolve(&validator, &headers("Bearer garbage"), now),
            Identity::Anonymous(AuthError::Malformed)
        );
    }
}
