//! Client registration and authentication.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::secret;
use crate::storage::ClientStorage;
use crate::types::Client;

/// Registers clients and authenticates them at the token endpoint.
#[derive(Clone)]
pub struct ClientRegistry {
    client_storage: Arc<dyn ClientStorage>,
}

impl ClientRegistry {
    /// Creates a new registry over the given storage.
    #[must_use]
    pub fn new(client_storage: Arc<dyn ClientStorage>) -> Self {
        Self { client_storage }
    }

    /// Registers a new confidential client.
    ///
    /// Generates the client id and secret, stores the secret's Argon2
    /// hash, and returns the raw secret. This is the only time the raw
    /// secret is ever available.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the name is empty or any redirect URI
    /// is not an absolute URI, and `Storage` if persistence fails.
    pub async fn register(
        &self,
        name: &str,
        redirect_uris: Vec<String>,
    ) -> AuthResult<(Client, String)> {
        let raw_secret = secret::generate_client_secret();
        let secret_hash = secret::hash_password(&raw_secret)
            .map_err(|e| AuthError::internal(format!("failed to hash client secret: {e}")))?;

        let client = Client {
            client_id: Uuid::new_v4().to_string(),
            secret_hash,
            name: name.to_string(),
            redirect_uris,
            created_at: OffsetDateTime::now_utc(),
        };

        client
            .validate()
            .map_err(|e| AuthError::invalid_request(e.to_string()))?;

        self.client_storage.create(&client).await?;

        info!(client_id = %client.client_id, name = %client.name, "registered client");
        Ok((client, raw_secret))
    }

    /// Looks up a client by id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the client is not registered.
    pub async fn find(&self, client_id: &str) -> AuthResult<Client> {
        self.client_storage
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("unknown client"))
    }

    /// Authenticates a client by id and secret.
    ///
    /// The failure message never reveals whether the id or the secret
    /// was wrong.
    ///
    /// # Errors
    ///
    /// Returns `InvalidClient` if the credentials do not match a
    /// registered client.
    pub async fn authenticate(&self, client_id: &str, client_secret: &str) -> AuthResult<Client> {
        let verified = self
            .client_storage
            .verify_secret(client_id, client_secret)
            .await?;

        if !verified {
            debug!(client_id = %client_id, "client authentication failed");
            return Err(AuthError::invalid_client("invalid client credentials"));
        }

        // verify_secret returning true implies the client exists.
        self.client_storage
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("invalid client credentials"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::RwLock;

    struct MockClientStorage {
        clients: RwLock<HashMap<String, Client>>,
    }

    impl MockClientStorage {
        fn new() -> Self {
            Self {
                clients: RwLock::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl ClientStorage for MockClientStorage {
        async fn create(&self, client: &Client) -> AuthResult<()> {
            self.clients
                .write()
                .unwrap()
                .insert(client.client_id.clone(), client.clone());
            Ok(())
        }

        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            Ok(self.clients.read().unwrap().get(client_id).cloned())
        }

        async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
            let Some(client) = self.clients.read().unwrap().get(client_id).cloned() else {
                return Ok(false);
            };
            crate::secret::verify_password(secret, &client.secret_hash)
                .map_err(|e| AuthError::internal(e.to_string()))
        }
    }

    fn registry() -> ClientRegistry {
        ClientRegistry::new(Arc::new(MockClientStorage::new()))
    }

    #[tokio::test]
    async fn test_register_returns_raw_secret_once() {
        let registry = registry();
        let (client, raw) = registry
            .register("Test App", vec!["https://app.example.com/cb".to_string()])
            .await
            .unwrap();

        assert!(raw.starts_with("kf_"));
        // Only the hash is stored.
        assert!(client.secret_hash.starts_with("$argon2id$"));
        assert_ne!(client.secret_hash, raw);
    }

    #[tokio::test]
    async fn test_register_rejects_empty_name() {
        let err = registry()
            .register("", vec!["https://app.example.com/cb".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_register_rejects_relative_redirect_uri() {
        let err = registry()
            .register("Test App", vec!["/callback".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_redirect_uris() {
        let err = registry().register("Test App", vec![]).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }

    #[tokio::test]
    async fn test_authenticate_round_trip() {
        let registry = registry();
        let (client, raw) = registry
            .register("Test App", vec!["https://app.example.com/cb".to_string()])
            .await
            .unwrap();

        let authenticated = registry.authenticate(&client.client_id, &raw).await.unwrap();
        assert_eq!(authenticated.client_id, client.client_id);
    }

    #[tokio::test]
    async fn test_authenticate_failure_is_uniform() {
        let registry = registry();
        let (client, _raw) = registry
            .register("Test App", vec!["https://app.example.com/cb".to_string()])
            .await
            .unwrap();

        let wrong_secret = registry
            .authenticate(&client.client_id, "kf_wrong")
            .await
            .unwrap_err();
        let unknown_client = registry
            .authenticate("no-such-client", "kf_wrong")
            .await
            .unwrap_err();

        // Same variant and message regardless of which part was wrong.
        assert_eq!(wrong_secret.to_string(), unknown_client.to_string());
    }
}
