//! User routes. Everything except registration requires an identity under
//! the default access policy.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::auth::models::AuthUser;
use crate::database::{CreateUserRequest, UserDto};
use crate::error::ApiError;
use crate::routes::auth::register;
use crate::server::AppState;

/// Account of the caller, resolved from the identity bound to the request.
pub async fn me(
    State(app_state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserDto>, ApiError> {
    let user = app_state
        .users
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Token for user id {} refers to a missing account", auth_user.user_id);
            ApiError::NotFound("User not found".to_string())
        })?;
    Ok(Json(UserDto::from(&user)))
}

pub async fn list_users(State(app_state): State<AppState>) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = app_state.users.list().await?;
    Ok(Json(users.iter().map(UserDto::from).collect()))
}

pub async fn get_user(
    State(app_state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let Path(id) = path?;
    app_state
        .users
        .find_by_id(id)
        .await?
        .map(|user| Json(UserDto::from(&user)))
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    auth_user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let Path(id) = path?;
    let Json(payload) = body?;

    let user = app_state.auth_service.update_user(id, payload).await?;
    tracing::info!("User {} updated by {}", id, auth_user.email);
    Ok(Json(user))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    auth_user: AuthUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = path?;
    app_state.users.delete(id).await?;
    tracing::info!("User {} deleted by {}", id, auth_user.email);
    Ok(StatusCode::NO_CONTENT)
}

pub fn create_user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/register", post(register))
        .route("/api/users/me", get(me))
        .route("/api/users/{id}", get(get_user).put(update_user).delete(delete_user))
}
