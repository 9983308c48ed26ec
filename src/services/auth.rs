//! Login, registration and account edits.
//!
//! Login checks the password with the credential verifier before the codec is
//! asked for a token; nothing is issued on a mismatch.

use std::sync::Arc;

use crate::auth::{
    error::AuthError, jwt::JwtService, models::TokenResponse, password::CredentialVerifier,
};
use crate::database::{
    models::{email_problem, normalize_email},
    CreateUserRequest, NewUser, UserDto, UserStore,
};
use crate::error::ApiError;

#[derive(Clone)]
pub struct AuthService {
    codec: Arc<JwtService>,
    verifier: CredentialVerifier,
    users: Arc<dyn UserStore>,
}

impl AuthService {
    pub fn new(codec: Arc<JwtService>, verifier: CredentialVerifier, users: Arc<dyn UserStore>) -> Self {
        Self { codec, verifier, users }
    }

    pub async fn register(&self, request: CreateUserRequest) -> Result<UserDto, ApiError> {
        let errors = request.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        let email = normalize_email(&request.email);
        if self.users.find_by_email(&email).await?.is_some() {
            tracing::warn!("Registration attempt with an email already in use: {}", email);
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.verifier.hash_async(&request.password).await?;
        let user = self
            .users
            .insert(NewUser {
                name: request.name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        tracing::info!("User registered with id {}", user.id);
        Ok(UserDto::from(&user))
    }

    /// Replace name, email and password of an existing account. The password is
    /// re-hashed; tokens already issued for the old email stay valid until expiry.
    pub async fn update_user(&self, id: i64, request: CreateUserRequest) -> Result<UserDto, ApiError> {
        let errors = request.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }

        if self.users.find_by_id(id).await?.is_none() {
            tracing::warn!("Update requested for missing user id {}", id);
            return Err(ApiError::NotFound("User not found".to_string()));
        }

        let password_hash = self.verifier.hash_async(&request.password).await?;
        let user = self
            .users
            .update(
                id,
                NewUser {
                    name: request.name.trim().to_string(),
                    email: normalize_email(&request.email),
                    password_hash,
                },
            )
            .await?;

        tracing::info!("User {} updated", user.id);
        Ok(UserDto::from(&user))
    }

    /// Verify credentials and issue a token. Unknown emails and wrong passwords
    /// produce the same `InvalidPassword` error after comparable work.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        if email_problem(email).is_some() || password.is_empty() {
            return Err(ApiError::BadRequest("email and password are required".to_string()));
        }

        let email = normalize_email(email);
        tracing::info!("Authenticating user {}", email);

        let Some(user) = self.users.find_by_email(&email).await? else {
            self.verifier.verify_dummy_async(password).await?;
            tracing::warn!("Login failed for {}: unknown account", email);
            return Err(AuthError::InvalidPassword.into());
        };

        if !self.verifier.verify_async(password, &user.password_hash).await? {
            tracing::warn!("Login failed for {}: password mismatch", email);
            return Err(AuthError::InvalidPassword.into());
        }

        let token = self.codec.create_token(&user.email, user.id)?;
        tracing::info!("User {} authenticated", email);

        Ok(TokenResponse::new(
            token,
            self.codec.lifetime().num_milliseconds(),
            UserDto::from(&user),
        ))
    }
}
