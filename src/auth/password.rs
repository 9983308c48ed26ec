//! Credential Verifier
//!
//! Argon2id password hashing with a per-hash random salt and fixed cost
//! parameters. Hashing is CPU-heavy, so the async entry points run on the
//! blocking pool behind a semaphore.

use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use tokio::sync::Semaphore;

use crate::auth::error::AuthError;

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

#[derive(Clone)]
pub struct CredentialVerifier {
    argon2: Argon2<'static>,
    decoy_hash: Arc<str>,
    permits: Arc<Semaphore>,
}

impl CredentialVerifier {
    /// Verifier with argon2's recommended default cost.
    pub fn new(max_concurrency: usize) -> Result<Self, AuthError> {
        Self::with_params(Params::DEFAULT, max_concurrency)
    }

    pub fn with_params(params: Params, max_concurrency: usize) -> Result<Self, AuthError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let decoy_hash = hash_with(&argon2, DECOY_PASSWORD)?;

        Ok(Self {
            argon2,
            decoy_hash: Arc::from(decoy_hash),
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
        })
    }

    /// Hash a password into a PHC string (algorithm, cost, salt and digest).
    pub fn hash(&self, plain: &str) -> Result<String, AuthError> {
        hash_with(&self.argon2, plain)
    }

    /// True iff `stored_hash` was produced from `plain`. A stored hash that
    /// cannot be parsed never matches.
    pub fn verify(&self, plain: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Stored password hash is unreadable: {}", e);
                return false;
            }
        };
        self.argon2.verify_password(plain.as_bytes(), &parsed).is_ok()
    }

    /// Burn the same work as a real verification for accounts that do not exist.
    pub fn verify_dummy(&self, plain: &str) -> bool {
        let _ = self.verify(plain, &self.decoy_hash);
        false
    }

    pub async fn hash_async(&self, plain: &str) -> Result<String, AuthError> {
        let plain = plain.to_owned();
        self.run_blocking(move |verifier| verifier.hash(&plain)).await?
    }

    pub async fn verify_async(&self, plain: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let plain = plain.to_owned();
        let stored_hash = stored_hash.to_owned();
        self.run_blocking(move |verifier| verifier.verify(&plain, &stored_hash)).await
    }

    pub async fn verify_dummy_async(&self, plain: &str) -> Result<bool, AuthError> {
        let plain = plain.to_owned();
        self.run_blocking(move |verifier| verifier.verify_dummy(&plain)).await
    }

    async fn run_blocking<T, F>(&self, work: F) -> Result<T, AuthError>
    where
        T: Send + 'static,
        F: FnOnce(&CredentialVerifier) -> T + Send + 'static,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let verifier = self.clone();
        tokio::task::spawn_blocking(move || work(&verifier))
            .await
            .map_err(|e| AuthError::Internal(format!("password hashing task failed: {e}")))
    }
}

fn hash_with(argon2: &Argon2<'_>, plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Internal(format!("failed to hash password: {e}")))
}

#[cfg(test)]
pub(crate) fn test_verifier() -> CredentialVerifier {
    let params = Params::new(1024, 1, 1, None).unwrap();
    CredentialVerifier::with_params(params, 2).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() {
        let verifier = test_verifier();
        let hash = verifier.hash("senha123").unwrap();

        assert_ne!(hash, "senha123");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verifier.verify("senha123", &hash));

        for wrong in ["", "senha1234", "SENHA123", "Senha123", "senha12", " senha123"] {
            assert!(!verifier.verify(wrong, &hash), "{wrong:?} must not match");
        }
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let verifier = test_verifier();
        let first = verifier.hash("senha123").unwrap();
        let second = verifier.hash("senha123").unwrap();

        assert_ne!(first, second);
        assert!(verifier.verify("senha123", &first));
        assert!(verifier.verify("senha123", &second));
    }

    #[test]
    fn verifies_hash_made_with_other_cost() {
        let verifier = test_verifier();
        let stronger = CredentialVerifier::with_params(Params::new(2048, 2, 1, None).unwrap(), 1).unwrap();
        let hash = stronger.hash("senha123").unwrap();

        assert!(verifier.verify("senha123", &hash));
    }

    #[test]
    fn unreadable_hash_never_matches() {
        let verifier = test_verifier();
        assert!(!verifier.verify("senha123", "not-a-phc-string"));
        assert!(!verifier.verify("", ""));
    }

    #[test]
    fn dummy_verification_always_fails() {
        let verifier = test_verifier();
        assert!(!verifier.verify_dummy(DECOY_PASSWORD));
        assert!(!verifier.verify_dummy("anything"));
    }

    #[tokio::test]
    async fn async_paths_match_sync_results() {
        let verifier = test_verifier();
        let hash = verifier.hash_async("senha123").await.unwrap();

        assert!(verifier.verify_async("senha123", &hash).await.unwrap());
        assert!(!verifier.verify_async("senhaErrada", &hash).await.unwrap());
        assert!(!verifier.verify_dummy_async("senha123").await.unwrap());
    }
}
