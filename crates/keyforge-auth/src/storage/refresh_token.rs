//! Refresh token storage trait.
//!
//! Only SHA-256 hashes of token values are ever stored; the raw value
//! exists only in the token response sent to the client.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::RefreshToken;

/// Storage trait for refresh tokens.
#[async_trait]
pub trait RefreshTokenStorage: Send + Sync {
    /// Creates a new refresh token record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    async fn create(&self, token: &RefreshToken) -> AuthResult<()>;

    /// Finds a token record by the hash of its value.
    ///
    /// Returns records regardless of their revoked/expired status;
    /// callers should check `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>>;

    /// Revokes a token by the hash of its value.
    ///
    /// Idempotent: revoking an unknown or already-revoked hash is a
    /// no-op, not an error. The first revocation timestamp is kept.
    ///
    /// Returns `true` only when this call performed the live-to-revoked
    /// transition. The check and the mark must happen as one atomic
    /// step, so of several concurrent revocations of the same hash
    /// exactly one observes `true`. Rotation leans on this to pick a
    /// single winner.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation itself fails.
    async fn revoke(&self, token_hash: &str) -> AuthResult<bool>;

    /// Deletes expired token records.
    ///
    /// Should be called periodically to prevent storage growth.
    ///
    /// # Returns
    ///
    /// The number of records deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the cleanup operation fails.
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
