// User storage
//
// The authentication flow only needs lookups by email and id plus account
// creation and edits; anything that can answer those can stand behind `UserStore`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use thiserror::Error;

use crate::database::models::User;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,
    #[error("user {0} not found")]
    NotFound(i64),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Fields needed to create an account, or the replacement values on update.
/// The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<User>, StoreError>;
    /// Replace name, email and password hash. The new email must not belong to
    /// another account.
    async fn update(&self, id: i64, changes: NewUser) -> Result<User, StoreError>;
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    by_id: BTreeMap<i64, User>,
    id_by_email: HashMap<String, i64>,
}

/// Process-local store. Both indexes sit under one lock so the
/// email-uniqueness check and the insert are a single step.
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write();
        if tables.id_by_email.contains_key(&user.email) {
            return Err(StoreError::EmailTaken);
        }

        tables.next_id += 1;
        let now = Utc::now().timestamp_millis();
        let stored = User {
            id: tables.next_id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            active: true,
            created_at: now,
            updated_at: now,
        };

        tables.id_by_email.insert(stored.email.clone(), stored.id);
        tables.by_id.insert(stored.id, stored.clone());
        tracing::debug!("Stored user id={}", stored.id);
        Ok(stored)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .id_by_email
            .get(email)
            .and_then(|id| tables.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().by_id.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.tables.read().by_id.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: NewUser) -> Result<User, StoreError> {
        let mut guard = self.tables.write();
        let tables = &mut *guard;

        let user = tables.by_id.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if changes.email != user.email {
            if tables.id_by_email.contains_key(&changes.email) {
                return Err(StoreError::EmailTaken);
            }
            tables.id_by_email.remove(&user.email);
            tables.id_by_email.insert(changes.email.clone(), id);
        }

        user.name = changes.name;
        user.email = changes.email;
        user.password_hash = changes.password_hash;
        user.updated_at = Utc::now().timestamp_millis().max(user.created_at);

        tracing::debug!("Updated user id={}", id);
        Ok(user.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let removed = tables.by_id.remove(&id).ok_or(StoreError::NotFound(id))?;
        tables.id_by_email.remove(&removed.email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "João Silva".into(),
            email: email.into(),
            password_hash: "hash".into(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = InMemoryUserStore::new();
        let first = store.insert(new_user("a@example.com")).await.unwrap();
        let second = store.insert(new_user("b@example.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(first.active);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(new_user("a@example.com")).await.unwrap();
        assert_eq!(
            store.insert(new_user("a@example.com")).await.unwrap_err(),
            StoreError::EmailTaken
        );
    }

    #[tokio::test]
    async fn update_replaces_fields_and_moves_email_index() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@example.com")).await.unwrap();

        let updated = store
            .update(
                user.id,
                NewUser {
                    name: "Maria Souza".into(),
                    email: "maria@example.com".into(),
                    password_hash: "new-hash".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, user.id);
        assert_eq!(updated.name, "Maria Souza");
        assert_eq!(updated.password_hash, "new-hash");
        assert_eq!(updated.created_at, user.created_at);
        assert!(updated.updated_at >= user.updated_at);
        assert_eq!(store.find_by_email("a@example.com").await.unwrap(), None);
        assert_eq!(store.find_by_email("maria@example.com").await.unwrap(), Some(updated));

        // keeping the same email is not a conflict with itself
        store.update(user.id, new_user("maria@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn update_rejects_taken_email_and_unknown_id() {
        let store = InMemoryUserStore::new();
        let first = store.insert(new_user("a@example.com")).await.unwrap();
        store.insert(new_user("b@example.com")).await.unwrap();

        assert_eq!(
            store.update(first.id, new_user("b@example.com")).await.unwrap_err(),
            StoreError::EmailTaken
        );
        assert_eq!(store.find_by_id(first.id).await.unwrap(), Some(first));

        assert_eq!(
            store.update(99, new_user("c@example.com")).await.unwrap_err(),
            StoreError::NotFound(99)
        );
    }

    #[tokio::test]
    async fn lookups_and_delete() {
        let store = InMemoryUserStore::new();
        let user = store.insert(new_user("a@example.com")).await.unwrap();

        assert_eq!(store.find_by_email("a@example.com").await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_by_id(user.id).await.unwrap(), Some(user.clone()));
        assert_eq!(store.find_by_email("missing@example.com").await.unwrap(), None);

        store.delete(user.id).await.unwrap();
        assert_eq!(store.find_by_email("a@example.com").await.unwrap(), None);
        assert_eq!(store.delete(user.id).await.unwrap_err(), StoreError::NotFound(user.id));

        // email is free again after deletion
        store.insert(new_user("a@example.com")).await.unwrap();
    }
}
