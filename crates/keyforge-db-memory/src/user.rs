//! In-memory user storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use keyforge_auth::AuthResult;
use keyforge_auth::error::AuthError;
use keyforge_auth::storage::UserStorage;
use keyforge_auth::types::User;

/// In-memory [`UserStorage`] keyed by user id, with email uniqueness
/// enforced on create.
#[derive(Debug, Default)]
pub struct InMemoryUserStorage {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;

        // Uniqueness check and insert under the same write lock.
        if users.values().any(|u| u.email == user.email) {
            return Err(AuthError::invalid_request("email already registered"));
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = InMemoryUserStorage::new();
        let user = User::new("user@example.com", "$argon2id$hash");

        storage.create(&user).await.unwrap();

        let by_email = storage
            .find_by_email("user@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = storage.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let storage = InMemoryUserStorage::new();
        storage
            .create(&User::new("user@example.com", "hash-a"))
            .await
            .unwrap();

        let err = storage
            .create(&User::new("user@example.com", "hash-b"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let storage = InMemoryUserStorage::new();
        assert!(storage.find_by_email("ghost@example.com").await.unwrap().is_none());
        assert!(storage.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }
}
