//! Resource owner domain type.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A registered resource owner.
///
/// The password is stored only as an Argon2 hash; the hash never leaves
/// the server (it is skipped on serialization).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,

    /// Login identifier, unique across users.
    pub email: String,

    /// Argon2 PHC hash of the user's password.
    #[serde(default, skip_serializing)]
    pub password_hash: String,

    /// Timestamp when the user was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    /// Creates a new user with a freshly generated id.
    #[must_use]
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_assigns_unique_ids() {
        let a = User::new("a@example.com", "$argon2id$hash");
        let b = User::new("b@example.com", "$argon2id$hash");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User::new("a@example.com", "$argon2id$secret");
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("a@example.com"));
    }
}
