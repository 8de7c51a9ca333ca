//! In-memory refresh token storage.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use keyforge_auth::AuthResult;
use keyforge_auth::error::AuthError;
use keyforge_auth::storage::RefreshTokenStorage;
use keyforge_auth::types::RefreshToken;

/// In-memory [`RefreshTokenStorage`] keyed by token hash.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenStorage {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenStorage for InMemoryRefreshTokenStorage {
    async fn create(&self, token: &RefreshToken) -> AuthResult<()> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token_hash) {
            return Err(AuthError::storage("refresh token collision"));
        }

        tokens.insert(token.token_hash.clone(), token.clone());
        Ok(())
    }

    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshToken>> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str) -> AuthResult<bool> {
        let mut tokens = self.tokens.write().await;

        // First revocation timestamp is kept; repeats are no-ops. The
        // check-and-mark happens under the one write lock, so exactly
        // one caller sees the transition.
        if let Some(token) = tokens.get_mut(token_hash)
            && token.revoked_at.is_none()
        {
            token.revoked_at = Some(OffsetDateTime::now_utc());
            return Ok(true);
        }

        Ok(false)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|_, token| !token.is_expired());
        Ok((before - tokens.len()) as u64)
    }
}
