//! User storage trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::AuthResult;
use crate::types::User;

/// Storage trait for registered users.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if a user with the same email already
    /// exists, or `Storage` if the operation fails.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Finds a user by email.
    ///
    /// Returns `Some(user)` if found, `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Finds a user by id.
    ///
    /// Returns `Some(user)` if found, `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>>;
}
