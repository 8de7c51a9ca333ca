//! Authorization code storage trait.
//!
//! # Implementation Notes
//!
//! Implementations should:
//!
//! - Support efficient lookup by code value
//! - Ensure atomicity for consume operations (prevent replay attacks)
//! - Clean up expired codes periodically
//!
//! # Security Considerations
//!
//! - Never log authorization codes
//! - Ensure consume is atomic to prevent race conditions

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizationCode;

/// Storage trait for authorization codes.
///
/// Codes are created when the resource owner authenticates and consumed
/// exactly once when exchanged for tokens.
#[async_trait]
pub trait AuthorizationCodeStorage: Send + Sync {
    /// Creates a new authorization code record.
    ///
    /// # Errors
    ///
    /// Returns an error if the code cannot be stored (duplicate code
    /// value, storage unavailable).
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()>;

    /// Finds a code record by its code value.
    ///
    /// Returns records regardless of their consumed/expired status;
    /// callers should check `is_valid()` before using.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>>;

    /// Consumes an authorization code (marks as used).
    ///
    /// This operation must be atomic: when two exchanges race on the
    /// same code, exactly one caller receives the record and the other
    /// receives `InvalidGrant`. A conditional update pattern satisfies
    /// this:
    ///
    /// ```sql
    /// UPDATE auth_codes
    /// SET consumed_at = NOW()
    /// WHERE code = $1 AND consumed_at IS NULL AND expires_at > NOW()
    /// RETURNING *
    /// ```
    ///
    /// # Returns
    ///
    /// The consumed record with `consumed_at` set.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrant` if the code is not found, already
    /// consumed, or expired; `Storage` if the operation fails.
    async fn consume(&self, code: &str) -> AuthResult<AuthorizationCode>;

    /// Deletes expired code records.
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
