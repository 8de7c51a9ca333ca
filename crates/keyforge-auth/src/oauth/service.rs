//! Authorization endpoint service.
//!
//! Validates authorization requests, authenticates the resource owner,
//! and issues single-use authorization codes.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::authorize::AuthorizationRequest;
use crate::secret;
use crate::storage::{AuthorizationCodeStorage, ClientStorage, UserStorage};
use crate::types::{AuthorizationCode, Client, ScopeSet};

/// Configuration for the authorization endpoint.
#[derive(Debug, Clone)]
pub struct AuthorizationConfig {
    /// Lifetime of issued authorization codes.
    pub code_lifetime: time::Duration,
}

impl Default for AuthorizationConfig {
    fn default() -> Self {
        Self {
            code_lifetime: time::Duration::minutes(10),
        }
    }
}

/// Handles the authorization step of the authorization code flow.
#[derive(Clone)]
pub struct AuthorizationService {
    client_storage: Arc<dyn ClientStorage>,
    user_storage: Arc<dyn UserStorage>,
    code_storage: Arc<dyn AuthorizationCodeStorage>,
    config: AuthorizationConfig,
}

impl AuthorizationService {
    /// Creates a new authorization service.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        user_storage: Arc<dyn UserStorage>,
        code_storage: Arc<dyn AuthorizationCodeStorage>,
        config: AuthorizationConfig,
    ) -> Self {
        Self {
            client_storage,
            user_storage,
            code_storage,
            config,
        }
    }

    /// Validates an authorization request and resolves its client.
    ///
    /// Validation order:
    ///
    /// 1. Required parameters present (`client_id`, `redirect_uri`)
    /// 2. `response_type` is `code`
    /// 3. Client is registered
    /// 4. Redirect URI exactly matches a registered URI
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for missing or unsupported parameters,
    /// `InvalidClient` for an unknown client, and `InvalidRedirectUri`
    /// for an unregistered redirect URI. Redirect failures are reported
    /// to the caller directly, never via redirect.
    pub async fn validate(&self, request: &AuthorizationRequest) -> AuthResult<Client> {
        let client_id = request
            .client_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("missing client_id parameter"))?;

        let redirect_uri = request
            .redirect_uri
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("missing redirect_uri parameter"))?;

        match request.response_type.as_deref() {
            Some("code") => {}
            Some(other) => {
                return Err(AuthError::invalid_request(format!(
                    "unsupported response_type: {other}"
                )));
            }
            None => {
                return Err(AuthError::invalid_request(
                    "missing response_type parameter",
                ));
            }
        }

        let client = self
            .client_storage
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("unknown client"))?;

        if !client.is_redirect_uri_allowed(redirect_uri) {
            debug!(client_id = %client.client_id, "redirect URI not registered");
            return Err(AuthError::invalid_redirect_uri(redirect_uri));
        }

        Ok(client)
    }

    /// Authenticates the resource owner and issues an authorization code.
    ///
    /// The request is re-validated first so a tampered login form cannot
    /// bypass client and redirect checks. A fresh code is issued on every
    /// successful login; earlier unexpired codes are left to expire.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` when the email or password is wrong
    /// (retryable at the login form), plus everything [`validate`] can
    /// return.
    ///
    /// [`validate`]: AuthorizationService::validate
    pub async fn login(
        &self,
        request: &AuthorizationRequest,
        email: &str,
        password: &str,
    ) -> AuthResult<AuthorizationCode> {
        let client = self.validate(request).await?;

        let user = self
            .user_storage
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::unauthenticated("invalid email or password"))?;

        let password_ok = secret::verify_password(password, &user.password_hash)
            .map_err(|e| AuthError::internal(format!("stored password hash malformed: {e}")))?;
        if !password_ok {
            debug!(client_id = %client.client_id, "resource owner authentication failed");
            return Err(AuthError::unauthenticated("invalid email or password"));
        }

        let now = OffsetDateTime::now_utc();
        let code = AuthorizationCode {
            id: Uuid::new_v4(),
            code: AuthorizationCode::generate_code(),
            client_id: client.client_id.clone(),
            user_id: user.id,
            // Stored exactly as validated; the token request must match it.
            redirect_uri: request.redirect_uri.clone().unwrap_or_default(),
            scope: ScopeSet::parse(request.scope.as_deref().unwrap_or("")),
            created_at: now,
            expires_at: now + self.config.code_lifetime,
            consumed_at: None,
        };

        self.code_storage.create(&code).await?;

        info!(
            client_id = %client.client_id,
            user_id = %user.id,
            "issued authorization code"
        );
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::RwLock;

    use crate::types::User;

    struct MockClientStorage {
        clients: RwLock<HashMap<String, Client>>,
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

        async fn verify_secret(&self, _client_id: &str, _secret: &str) -> AuthResult<bool> {
            Ok(false)
        }
    }

    struct MockUserStorage {
        users: RwLock<HashMap<String, User>>,
    }

    #[async_trait]
    impl UserStorage for MockUserStorage {
        async fn create(&self, user: &User) -> AuthResult<()> {
            self.users
                .write()
                .unwrap()
                .insert(user.email.clone(), user.clone());
            Ok(())
        }

        async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
            Ok(self.users.read().unwrap().get(email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<User>> {
            Ok(self
                .users
                .read()
                .unwrap()
                .values()
                .find(|u| u.id == id)
                .cloned())
        }
    }

    struct MockCodeStorage {
        codes: RwLock<HashMap<String, AuthorizationCode>>,
    }

    #[async_trait]
    impl AuthorizationCodeStorage for MockCodeStorage {
        async fn create(&self, code: &AuthorizationCode) -> AuthResult<()> {
            self.codes
                .write()
                .unwrap()
                .insert(code.code.clone(), code.clone());
            Ok(())
        }

        async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizationCode>> {
            Ok(self.codes.read().unwrap().get(code).cloned())
        }

        async fn consume(&self, code: &str) -> AuthResult<AuthorizationCode> {
            let mut codes = self.codes.write().unwrap();
            let record = codes
                .get_mut(code)
                .ok_or_else(|| AuthError::invalid_grant("unknown authorization code"))?;
            record.consumed_at = Some(OffsetDateTime::now_utc());
            Ok(record.clone())
        }

        async fn cleanup_expired(&self) -> AuthResult<u64> {
            Ok(0)
        }
    }

    fn service() -> AuthorizationService {
        let clients = Arc::new(MockClientStorage {
            clients: RwLock::new(HashMap::new()),
        });
        let users = Arc::new(MockUserStorage {
            users: RwLock::new(HashMap::new()),
        });
        let codes = Arc::new(MockCodeStorage {
            codes: RwLock::new(HashMap::new()),
        });
        AuthorizationService::new(clients, users, codes, AuthorizationConfig::default())
    }

    async fn seed_client(service: &AuthorizationService) -> Client {
        let client = Client {
            client_id: "client-1".to_string(),
            secret_hash: "$argon2id$hash".to_string(),
            name: "Test App".to_string(),
            redirect_uris: vec!["https://app.example.com/cb".to_string()],
            created_at: OffsetDateTime::now_utc(),
        };
        service.client_storage.create(&client).await.unwrap();
        client
    }

    async fn seed_user(service: &AuthorizationService, password: &str) -> User {
        let user = User::new(
            "user@example.com",
            secret::hash_password(password).unwrap(),
        );
        service.user_storage.create(&user).await.unwrap();
        user
    }

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: Some("code".to_string()),
            client_id: Some("client-1".to_string()),
            redirect_uri: Some("https://app.example.com/cb".to_string()),
            scope: Some("read write".to_string()),
            state: Some("xyz".to_string()),
        }
    }

    #[tokio::test]
    async fn test_validate_accepts_well_formed_request() {
        let service = service();
        seed_client(&service).await;

        let client = service.validate(&request()).await.unwrap();
        assert_eq!(client.client_id, "client-1");
    }

    #[tokio::test]
    async fn test_validate_rejects_missing_parameters() {
        let service = service();
        seed_client(&service).await;

        let mut req = request();
        req.client_id = None;
        assert!(matches!(
            service.validate(&req).await.unwrap_err(),
            AuthError::InvalidRequest { .. }
        ));

        let mut req = request();
        req.response_type = Some("token".to_string());
        assert!(matches!(
            service.validate(&req).await.unwrap_err(),
            AuthError::InvalidRequest { .. }
        ));
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_client() {
        let service = service();

        let err = service.validate(&request()).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_validate_rejects_unregistered_redirect_uri() {
        let service = service();
        seed_client(&service).await;

        let mut req = request();
        req.redirect_uri = Some("https://evil.example.com/cb".to_string());
        let err = service.validate(&req).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRedirectUri { .. }));
    }

    #[tokio::test]
    async fn test_login_issues_code() {
        let service = service();
        seed_client(&service).await;
        let user = seed_user(&service, "hunter2hunter2").await;

        let code = service
            .login(&request(), "user@example.com", "hunter2hunter2")
            .await
            .unwrap();

        assert_eq!(code.client_id, "client-1");
        assert_eq!(code.user_id, user.id);
        assert_eq!(code.redirect_uri, "https://app.example.com/cb");
        assert_eq!(code.scope.to_string(), "read write");
        assert!(code.is_valid());

        // Persisted under its code value.
        let stored = service
            .code_storage
            .find_by_code(&code.code)
            .await
            .unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let service = service();
        seed_client(&service).await;
        seed_user(&service, "hunter2hunter2").await;

        let err = service
            .login(&request(), "user@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_login_rejects_unknown_user() {
        let service = service();
        seed_client(&service).await;

        let err = service
            .login(&request(), "ghost@example.com", "whatever")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated { .. }));
    }

    #[tokio::test]
    async fn test_repeat_login_issues_fresh_code() {
        let service = service();
        seed_client(&service).await;
        seed_user(&service, "hunter2hunter2").await;

        let first = service
            .login(&request(), "user@example.com", "hunter2hunter2")
            .await
            .unwrap();
        let second = service
            .login(&request(), "user@example.com", "hunter2hunter2")
            .await
            .unwrap();

        assert_ne!(first.code, second.code);
        // The earlier code is untouched and left to expire on its own.
        let stored = service
            .code_storage
            .find_by_code(&first.code)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.is_valid());
    }
}
