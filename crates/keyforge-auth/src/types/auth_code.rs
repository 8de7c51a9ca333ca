//! Authorization code domain type.
//!
//! Authorization codes are short-lived, single-use credentials issued
//! after the resource owner authenticates, and exchanged for tokens at
//! the token endpoint.
//!
//! # Security
//!
//! - Codes are cryptographically random (256 bits)
//! - Codes expire after a short time (default 10 minutes)
//! - Codes are single-use; the consumed-at timestamp records redemption

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::types::ScopeSet;

/// A stored authorization code.
///
/// Captures everything the token endpoint needs to validate the exchange:
/// the issuing client, the exact redirect URI of the authorization request,
/// the granted scope, and the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    /// Unique record identifier.
    pub id: Uuid,

    /// Authorization code value (one-time use).
    /// 256-bit random value, base64url-encoded.
    pub code: String,

    /// Client the code was issued to.
    pub client_id: String,

    /// Authenticated resource owner.
    pub user_id: Uuid,

    /// Redirect URI from the authorization request.
    /// Must match the redirect_uri in the token request exactly.
    pub redirect_uri: String,

    /// Granted scopes.
    pub scope: ScopeSet,

    /// Timestamp when the code was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Timestamp when the code expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Timestamp when the code was exchanged (consumed).
    /// None until the code is used.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub consumed_at: Option<OffsetDateTime>,
}

impl AuthorizationCode {
    /// Generates a new cryptographically secure authorization code value.
    ///
    /// The code is 256 bits (32 bytes) of random data, encoded as
    /// base64url without padding (43 characters).
    #[must_use]
    pub fn generate_code() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the code has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the code has been consumed.
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Returns `true` if the code is valid for exchange.
    ///
    /// A code is valid if it is not expired and not consumed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_consumed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn test_code() -> AuthorizationCode {
        let now = OffsetDateTime::now_utc();
        AuthorizationCode {
            id: Uuid::new_v4(),
            code: AuthorizationCode::generate_code(),
            client_id: "client-1".to_string(),
            user_id: Uuid::new_v4(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: ScopeSet::parse("read write"),
            created_at: now,
            expires_at: now + Duration::minutes(10),
            consumed_at: None,
        }
    }

    #[test]
    fn test_generate_code_format() {
        let code = AuthorizationCode::generate_code();
        assert_eq!(code.len(), 43);
        assert!(
            code.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generate_code_uniqueness() {
        assert_ne!(
            AuthorizationCode::generate_code(),
            AuthorizationCode::generate_code()
        );
    }

    #[test]
    fn test_fresh_code_is_valid() {
        let code = test_code();
        assert!(!code.is_expired());
        assert!(!code.is_consumed());
        assert!(code.is_valid());
    }

    #[test]
    fn test_expired_code_is_invalid() {
        let mut code = test_code();
        code.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
        assert!(code.is_expired());
        assert!(!code.is_valid());
    }

    #[test]
    fn test_consumed_code_is_invalid() {
        let mut code = test_code();
        code.consumed_at = Some(OffsetDateTime::now_utc());
        assert!(code.is_consumed());
        assert!(!code.is_valid());
    }
}
