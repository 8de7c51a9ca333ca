//! Client storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage trait for OAuth client registrations.
///
/// Registrations are immutable after creation: the redirect URI set and
/// the secret hash are fixed at registration time.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Creates a new client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if a client with the same `client_id` already
    /// exists or the operation fails.
    async fn create(&self, client: &Client) -> AuthResult<()>;

    /// Finds a client by its client ID.
    ///
    /// Returns `Some(client)` if found, `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verifies a client secret against the stored hash.
    ///
    /// Returns `false` both when the client is unknown and when the
    /// secret does not match, so callers cannot distinguish the two.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails or the stored
    /// hash is malformed.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;
}
