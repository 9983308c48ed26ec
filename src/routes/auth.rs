//! Auth routes for registration, login, and logout

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use crate::auth::models::{LoginRequest, TokenResponse};
use crate::database::{CreateUserRequest, UserDto};
use crate::error::ApiError;
use crate::server::AppState;

pub async fn register(
    State(app_state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let Json(payload) = body?;
    let user = app_state.auth_service.register(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(app_state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(payload) = body?;
    let response = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;
    Ok(Json(response))
}

pub async fn logout() -> impl IntoResponse {
    // For stateless JWT, just return 204. Client deletes token.
    StatusCode::NO_CONTENT
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}
