//! Authentication Errors
//!
//! Failure classes produced while issuing, decoding and validating tokens and
//! while checking login credentials.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Token does not have the compact `header.payload.signature` shape, or a
    /// segment is not valid base64url / JSON / claim set.
    #[error("malformed token")]
    Malformed,
    /// Signature does not match the header and payload under the configured secret.
    #[error("invalid token signature")]
    InvalidSignature,
    /// Structurally valid and correctly signed, but past its expiry.
    #[error("token expired")]
    Expired,
    /// No bearer credential was supplied with the request.
    #[error("missing bearer credential")]
    MissingCredential,
    /// Login email/password pair did not match a stored account.
    #[error("invalid email or password")]
    InvalidPassword,
    /// Unexpected failure inside the signing or hashing machinery.
    #[error("internal authentication failure: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for failures caused by what the client sent, as opposed to
    /// failures inside the server.
    pub fn is_credential_error(&self) -> bool {
        !matches!(self, AuthError::Internal(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AuthError::Malformed,
            other => AuthError::Internal(format!("{other:?}")),
        }
    }
}
