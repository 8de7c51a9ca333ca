//! In-memory client storage.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use keyforge_auth::AuthResult;
use keyforge_auth::error::AuthError;
use keyforge_auth::secret;
use keyforge_auth::storage::ClientStorage;
use keyforge_auth::types::Client;

/// In-memory [`ClientStorage`] keyed by client id.
#[derive(Debug, Default)]
pub struct InMemoryClientStorage {
    clients: RwLock<HashMap<String, Client>>,
}

impl InMemoryClientStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientStorage for InMemoryClientStorage {
    async fn create(&self, client: &Client) -> AuthResult<()> {
        let mut clients = self.clients.write().await;

        if clients.contains_key(&client.client_id) {
            return Err(AuthError::storage("client_id already exists"));
        }

        clients.insert(client.client_id.clone(), client.clone());
        Ok(())
    }

    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.get(client_id).cloned())
    }

    async fn verify_secret(&self, client_id: &str, client_secret: &str) -> AuthResult<bool> {
        let secret_hash = {
            let clients = self.clients.read().await;
            match clients.get(client_id) {
                Some(client) => client.secret_hash.clone(),
                None => return Ok(false),
            }
        };

        // Argon2 verification runs outside the lock.
        secret::verify_password(client_secret, &secret_hash)
            .map_err(|e| AuthError::internal(format!("stored secret hash malformed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn client_with_secret(secret: &str) -> Client {
        Client {
            client_id: "client-1".to_string(),
            secret_hash: secret::hash_password(secret).unwrap(),
            name: "Test App".to_string(),
            redirect_uris: vec!["https://app.example.com/cb".to_string()],
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let storage = InMemoryClientStorage::new();
        storage.create(&client_with_secret("kf_secret")).await.unwrap();

        let found = storage.find_by_client_id("client-1").await.unwrap().unwrap();
        assert_eq!(found.name, "Test App");

        assert!(storage.find_by_client_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_client_id_rejected() {
        let storage = InMemoryClientStorage::new();
        storage.create(&client_with_secret("kf_a")).await.unwrap();

        let err = storage.create(&client_with_secret("kf_b")).await.unwrap_err();
        assert!(matches!(err, AuthError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_verify_secret() {
        let storage = InMemoryClientStorage::new();
        storage.create(&client_with_secret("kf_secret")).await.unwrap();

        assert!(storage.verify_secret("client-1", "kf_secret").await.unwrap());
        assert!(!storage.verify_secret("client-1", "kf_wrong").await.unwrap());
        // Unknown client is indistinguishable from a wrong secret.
        assert!(!storage.verify_secret("missing", "kf_secret").await.unwrap());
    }
}
