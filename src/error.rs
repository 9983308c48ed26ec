//! API error type and its JSON rendering.

use std::collections::BTreeMap;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Request,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::auth::error::AuthError;
use crate::database::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    /// Request path; filled in by [`attach_request_path`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::Internal(_)) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken => ApiError::Conflict("Email already registered".to_string()),
            StoreError::NotFound(_) => ApiError::NotFound("User not found".to_string()),
            StoreError::Backend(reason) => {
                tracing::error!("User store failure: {}", reason);
                ApiError::Internal
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, errors) = match self {
            ApiError::Auth(AuthError::Internal(reason)) => {
                tracing::error!("Internal authentication failure: {}", reason);
                ("internal server error".to_string(), None)
            }
            ApiError::Validation(errors) => ("validation failed".to_string(), Some(errors)),
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            timestamp: Utc::now(),
            status: status.as_u16(),
            message,
            errors,
            path: None,
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

/// Re-render error bodies produced further down the stack with the request path.
pub async fn attach_request_path(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let Some(mut body) = response.extensions().get::<ErrorResponse>().cloned() else {
        return response;
    };
    body.path = Some(path);
    (response.status(), Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::from(AuthError::InvalidPassword).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::from(AuthError::Expired).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(AuthError::Internal("x".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::from(StoreError::EmailTaken).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::from(StoreError::NotFound(3)).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(StoreError::Backend("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Validation(BTreeMap::new()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn internal_reason_is_not_rendered() {
        let response = ApiError::from(AuthError::Internal("key material detail".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.extensions().get::<ErrorResponse>().unwrap();
        assert_eq!(body.message, "internal server error");
        assert_eq!(body.path, None);
    }
}
