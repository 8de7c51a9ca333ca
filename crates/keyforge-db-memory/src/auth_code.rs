//! In-memory authorization code storage.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use keyforge_auth::AuthResult;
use keyforge_auth::error::AuthError;
use keyforge_auth::storage::AuthorizationCodeStorage;
use keyforge_auth::types::AuthorizationCode;

/// In-memory [`AuthorizationCodeStorage`] keyed by code value.
///
/// `consume` holds the single write lock across its check-and-mark, so
/// concurrent exchanges of the same code serialize and exactly one wins.
#[derive(Debug, Default)]
pub struct InMemoryAuthorizationCodeStorage {
    codes: RwLock<HashMap<String, AuthorizationCode>>,
}

impl InMemoryAuthorizationCodeStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorizationCodeStorage for InMemoryAuthorizationCodeStorage {
    async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
        let mut codes = self.codes.write().await;

        if codes.contains_key(&code.code) {
            return Err(AuthError::storage("authorization code collision"));
        }

        codes.insert(code.code.clone(), code.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
        let codes = self.codes.read().await;
        Ok(codes.get(code).cloned())
    }

    async fn consume(&self, code: &str) -> AuthResult<AuthorizationCode> {
        let mut codes = self.codes.write().await;

        let record = codes
            .get_mut(code)
            .ok_or_else(|| AuthError::invalid_grant("unknown authorization code"))?;

        if record.is_consumed() {
            return Err(AuthError::invalid_grant("authorization code already used"));
        }

        if record.is_expired() {
            return Err(AuthError::invalid_grant("authorization code expired"));
        }

        record.consumed_at = Some(OffsetDateTime::now_utc());
        Ok(record.clone())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let mut codes = self.codes.write().await;
        let before = codes.len();
        codes.retain(|_, record| !record.is_expired());
        Ok((before - codes.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use time::Duration;
    use uuid::Uuid;

    use keyforge_auth::types::ScopeSet;

    fn code_record(lifetime: Duration) -> AuthorizationCode {
        let now = OffsetDateTime::now_utc();
        AuthorizationCode {
            id: Uuid::new_v4(),
            code: AuthorizationCode::generate_code(),
            client_id: "client-1".to_string(),
            user_id: Uuid::new_v4(),
            redirect_uri: "https://app.example.com/cb".to_string(),
            scope: ScopeSet::parse("read"),
            created_at: now,
            expires_at: now + lifetime,
            consumed_at: None,
        }
    }

    #[tokio::test]
    async fn test_consume_marks_code_used() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        let record = code_record(Duration::minutes(10));
        storage.create(&record).await.unwrap();

        let consumed = storage.consume(&record.code).await.unwrap();
        assert!(consumed.consumed_at.is_some());

        let err = storage.consume(&record.code).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn test_consume_rejects_unknown_and_expired() {
        let storage = InMemoryAuthorizationCodeStorage::new();

        let err = storage.consume("no-such-code").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));

        let expired = code_record(Duration::seconds(-1));
        storage.create(&expired).await.unwrap();
        let err = storage.consume(&expired.code).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consume_single_winner() {
        let storage = Arc::new(InMemoryAuthorizationCodeStorage::new());
        let record = code_record(Duration::minutes(10));
        storage.create(&record).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let storage = Arc::clone(&storage);
            let code = record.code.clone();
            handles.push(tokio::spawn(async move {
                storage.consume(&code).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let storage = InMemoryAuthorizationCodeStorage::new();
        storage.create(&code_record(Duration::minutes(10))).await.unwrap();
        storage.create(&code_record(Duration::seconds(-1))).await.unwrap();
        storage.create(&code_record(Duration::seconds(-5))).await.unwrap();

        assert_eq!(storage.cleanup_expired().await.unwrap(), 2);
        assert_eq!(storage.cleanup_expired().await.unwrap(), 0);
    }
}
