// Database Models
//
// Stored user accounts and the request/response shapes derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stored user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub active: bool,
    /// Creation time, milliseconds since the Unix epoch
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub created_at: i64,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            active: user.active,
            created_at: user.created_at,
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl CreateUserRequest {
    /// Field-level validation; an empty map means the request is acceptable.
    pub fn validate(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            errors.insert("name".into(), "name must not be blank".into());
        } else if !(3..=100).contains(&name_len) {
            errors.insert("name".into(), "name must be between 3 and 100 characters".into());
        }

        if let Some(message) = email_problem(&self.email) {
            errors.insert("email".into(), message.into());
        }

        let password_len = self.password.chars().count();
        if self.password.trim().is_empty() {
            errors.insert("password".into(), "password must not be blank".into());
        } else if !(6..=100).contains(&password_len) {
            errors.insert("password".into(), "password must be between 6 and 100 characters".into());
        }

        errors
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn email_problem(email: &str) -> Option<&'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Some("email must not be blank");
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    (!valid).then_some("email must be a valid address")
}
