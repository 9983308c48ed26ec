//! Configuration module for environment variables and application settings

use std::env;
use std::fmt;
use std::num::NonZeroUsize;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// HS256 keys shorter than the hash output are rejected at startup.
pub const MIN_SECRET_BYTES: usize = 32;

/// Longest accepted token lifetime: one year.
pub const MAX_TOKEN_LIFETIME_MILLIS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Startup configuration errors. Any of these aborts process initialization.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable is required")]
    MissingSecret,
    #[error("JWT_SECRET must be at least {MIN_SECRET_BYTES} bytes, got {0}")]
    WeakSecret(usize),
    #[error("JWT_EXPIRATION_MS environment variable is required")]
    MissingLifetime,
    #[error("JWT_EXPIRATION_MS must be between 1 and {MAX_TOKEN_LIFETIME_MILLIS} milliseconds, got {0:?}")]
    InvalidLifetime(String),
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Token signing configuration
    pub auth: AuthConfig,

    /// Server configuration
    pub server: ServerConfig,

    /// Upper bound on concurrent password hash computations
    pub password_hash_concurrency: usize,
}

/// Secret material for signing tokens. `Debug` never prints the secret.
#[derive(Clone)]
pub struct AuthConfig {
    secret: SecretString,
    /// Token lifetime in milliseconds
    pub token_lifetime_millis: i64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>, token_lifetime_millis: i64) -> Result<Self, ConfigError> {
        let secret: String = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::WeakSecret(secret.len()));
        }
        if !(1..=MAX_TOKEN_LIFETIME_MILLIS).contains(&token_lifetime_millis) {
            return Err(ConfigError::InvalidLifetime(token_lifetime_millis.to_string()));
        }

        Ok(Self {
            secret: SecretString::from(secret),
            token_lifetime_millis,
        })
    }

    pub(crate) fn secret_bytes(&self) -> &[u8] {
        self.secret.expose_secret().as_bytes()
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.token_lifetime_millis)
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"[REDACTED]")
            .field("token_lifetime_millis", &self.token_lifetime_millis)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET").ok_or(ConfigError::MissingSecret)?;
        let lifetime_raw = lookup("JWT_EXPIRATION_MS").ok_or(ConfigError::MissingLifetime)?;
        let token_lifetime_millis = lifetime_raw
            .trim()
            .parse::<i64>()
            .map_err(|_| ConfigError::InvalidLifetime(lifetime_raw.clone()))?;

        let auth = AuthConfig::new(secret, token_lifetime_millis)?;

        let port: u16 = match lookup("PORT").or_else(|| lookup("SERVER_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "PORT", value: raw })?,
            None => 3000,
        };

        let password_hash_concurrency = match lookup("PASSWORD_HASH_CONCURRENCY") {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroUsize>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "PASSWORD_HASH_CONCURRENCY",
                    value: raw,
                })?
                .get(),
            None => std::thread::available_parallelism().map_or(4, NonZeroUsize::get),
        };

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3001".to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            auth,
            server: ServerConfig {
                host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
                cors_allowed_origins,
            },
            password_hash_concurrency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "a-very-long-test-secret-of-at-least-32-bytes";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn loads_required_and_default_values() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_MS", "86400000"),
        ]))
        .unwrap();

        assert_eq!(config.auth.token_lifetime_millis, 86_400_000);
        assert_eq!(config.auth.secret_bytes(), SECRET.as_bytes());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.cors_allowed_origins, vec!["http://localhost:3001"]);
        assert!(config.password_hash_concurrency >= 1);
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = Config::from_lookup(lookup(&[("JWT_EXPIRATION_MS", "1000")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret);

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", ""), ("JWT_EXPIRATION_MS", "1000")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::MissingSecret);
    }

    #[test]
    fn short_secret_is_fatal() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", "short"), ("JWT_EXPIRATION_MS", "1000")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::WeakSecret(5));
    }

    #[test]
    fn missing_or_bad_lifetime_is_fatal() {
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET)])).unwrap_err();
        assert_eq!(err, ConfigError::MissingLifetime);

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("JWT_EXPIRATION_MS", "soon")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidLifetime("soon".into()));

        let err = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("JWT_EXPIRATION_MS", "0")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidLifetime("0".into()));
    }

    #[test]
    fn oversized_lifetime_is_fatal() {
        let huge = i64::MAX.to_string();
        let err = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("JWT_EXPIRATION_MS", huge.as_str())]))
            .unwrap_err();
        assert_eq!(err, ConfigError::InvalidLifetime(huge.clone()));

        let over = (MAX_TOKEN_LIFETIME_MILLIS + 1).to_string();
        assert!(Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("JWT_EXPIRATION_MS", over.as_str())])).is_err());

        let max = MAX_TOKEN_LIFETIME_MILLIS.to_string();
        let config = Config::from_lookup(lookup(&[("JWT_SECRET", SECRET), ("JWT_EXPIRATION_MS", max.as_str())]))
            .unwrap();
        assert_eq!(config.auth.token_lifetime_millis, MAX_TOKEN_LIFETIME_MILLIS);
    }

    #[test]
    fn parses_optional_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_MS", "60000"),
            ("PORT", "8080"),
            ("SERVER_HOST", "127.0.0.1"),
            ("PASSWORD_HASH_CONCURRENCY", "2"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.password_hash_concurrency, 2);
        assert_eq!(
            config.server.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );

        let err = Config::from_lookup(lookup(&[
            ("JWT_SECRET", SECRET),
            ("JWT_EXPIRATION_MS", "60000"),
            ("PASSWORD_HASH_CONCURRENCY", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PASSWORD_HASH_CONCURRENCY", .. }));
    }

    #[test]
    fn debug_output_redacts_secret() {
        let auth = AuthConfig::new(SECRET, 1000).unwrap();
        let printed = format!("{auth:?}");
        assert!(!printed.contains(SECRET));
        assert!(printed.contains("REDACTED"));
    }
}
