//! Refresh token domain type.
//!
//! Refresh tokens are long-lived credentials for obtaining new access
//! tokens without re-authenticating the user.
//!
//! # Security
//!
//! - Token values are cryptographically random (256 bits)
//! - Only the SHA-256 hash of the token is persisted; the raw value is
//!   returned to the client exactly once
//! - Tokens can be revoked, and revocation is permanent

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::types::ScopeSet;

/// A stored refresh token record.
///
/// The raw token value never appears here; lookup is by SHA-256 hash.
/// The hash input is already high-entropy, so no salt is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshToken {
    /// Unique record identifier.
    pub id: Uuid,

    /// SHA-256 hash of the token value, hex-encoded.
    pub token_hash: String,

    /// Resource owner the token was issued for.
    pub user_id: Uuid,

    /// Client the token was issued to.
    pub client_id: String,

    /// Scopes granted at issuance. Refreshed access tokens carry
    /// exactly this scope.
    pub scope: ScopeSet,

    /// Timestamp when the token was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Timestamp when the token expires.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Timestamp when the token was revoked.
    /// None while the token is live.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl RefreshToken {
    /// Generates a new cryptographically secure refresh token value.
    ///
    /// The token is 256 bits (32 bytes) of random data, encoded as
    /// base64url without padding (43 characters).
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Computes the storage hash of a raw token value.
    #[must_use]
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Returns `true` if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the token has been revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the token can still be redeemed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}
