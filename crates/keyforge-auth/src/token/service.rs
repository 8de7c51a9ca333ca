//! Token endpoint service.
//!
//! Dispatch target for the token endpoint: exchanges authorization codes
//! for tokens and refreshes access tokens. Client authentication happens
//! before any method here is called.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::token::{TokenRequest, TokenResponse};
use crate::storage::{AuthorizationCodeStorage, RefreshTokenStorage, UserStorage};
use crate::token::jwt::{AccessTokenClaims, JwtService};
use crate::types::{Client, RefreshToken, ScopeSet, User};

/// Configuration for token issuance.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Lifetime of issued access tokens.
    pub access_token_lifetime: time::Duration,

    /// Lifetime of issued refresh tokens.
    pub refresh_token_lifetime: time::Duration,

    /// Whether the refresh grant rotates the refresh token. When
    /// enabled, the presented token is revoked and a replacement is
    /// returned in the response.
    pub rotate_refresh_tokens: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: time::Duration::hours(1),
            refresh_token_lifetime: time::Duration::days(7),
            rotate_refresh_tokens: false,
        }
    }
}

/// Handles the token step of both supported grants.
#[derive(Clone)]
pub struct TokenService {
    jwt_service: Arc<JwtService>,
    code_storage: Arc<dyn AuthorizationCodeStorage>,
    refresh_token_storage: Arc<dyn RefreshTokenStorage>,
    user_storage: Arc<dyn UserStorage>,
    config: TokenConfig,
}

impl TokenService {
    /// Creates a new token service.
    #[must_use]
    pub fn new(
        jwt_service: Arc<JwtService>,
        code_storage: Arc<dyn AuthorizationCodeStorage>,
        refresh_token_storage: Arc<dyn RefreshTokenStorage>,
        user_storage: Arc<dyn UserStorage>,
        config: TokenConfig,
    ) -> Self {
        Self {
            jwt_service,
            code_storage,
            refresh_token_storage,
            user_storage,
            config,
        }
    }

    /// Exchanges an authorization code for an access and refresh token.
    ///
    /// The code is consumed before the remaining checks run. A code
    /// redeemed with a mismatched client or redirect URI is therefore
    /// dead afterwards; `InvalidGrant` is terminal for that code.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for missing parameters and
    /// `InvalidGrant` for an unknown, consumed, expired, or mismatched
    /// code.
    pub async fn exchange_code(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let code_value = request
            .code
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("missing code parameter"))?;

        let redirect_uri = request
            .redirect_uri
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("missing redirect_uri parameter"))?;

        // Atomic: of two racing exchanges, exactly one gets the record.
        let code = self.code_storage.consume(code_value).await?;

        if code.is_expired() {
            return Err(AuthError::invalid_grant("authorization code expired"));
        }

        if code.client_id != client.client_id {
            debug!(client_id = %client.client_id, "code presented by wrong client");
            return Err(AuthError::invalid_grant(
                "authorization code was issued to another client",
            ));
        }

        if code.redirect_uri != redirect_uri {
            return Err(AuthError::invalid_grant(
                "redirect_uri does not match the authorization request",
            ));
        }

        let user = self.find_user(code.user_id).await?;
        let access_token = self.mint_access_token(&user, client, code.scope.clone())?;

        let refresh_token = self
            .issue_refresh_token(user.id, &client.client_id, code.scope.clone())
            .await?;

        info!(
            client_id = %client.client_id,
            user_id = %user.id,
            "exchanged authorization code"
        );
        Ok(self
            .token_response(access_token, code.scope)
            .with_refresh_token(refresh_token))
    }

    /// Refreshes an access token.
    ///
    /// The new access token carries exactly the scope granted when the
    /// refresh token was issued; a `scope` request parameter is ignored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the refresh token is missing and
    /// `InvalidGrant` if it is unknown, revoked, expired, or was issued
    /// to another client.
    pub async fn refresh(
        &self,
        request: &TokenRequest,
        client: &Client,
    ) -> AuthResult<TokenResponse> {
        let raw_token = request
            .refresh_token
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_request("missing refresh_token parameter"))?;

        let token_hash = RefreshToken::hash_token(raw_token);
        let token = self
            .refresh_token_storage
            .find_by_hash(&token_hash)
            .await?
            .ok_or_else(|| AuthError::invalid_grant("invalid refresh token"))?;

        if token.client_id != client.client_id {
            debug!(client_id = %client.client_id, "refresh token presented by wrong client");
            return Err(AuthError::invalid_grant(
                "refresh token was issued to another client",
            ));
        }

        if token.is_revoked() {
            return Err(AuthError::invalid_grant("refresh token revoked"));
        }

        if token.is_expired() {
            return Err(AuthError::invalid_grant("refresh token expired"));
        }

        let user = self.find_user(token.user_id).await?;
        let access_token = self.mint_access_token(&user, client, token.scope.clone())?;

        let mut response = self.token_response(access_token, token.scope.clone());

        if self.config.rotate_refresh_tokens {
            // Retire the presented token first. Only the caller whose
            // revoke performs the transition gets a replacement, so
            // concurrent refreshes of one token mint exactly one.
            let won = self.refresh_token_storage.revoke(&token.token_hash).await?;
            if !won {
                return Err(AuthError::invalid_grant("refresh token revoked"));
            }

            let replacement = RefreshToken::generate_token();
            let record = RefreshToken {
                id: Uuid::new_v4(),
                token_hash: RefreshToken::hash_token(&replacement),
                user_id: token.user_id,
                client_id: token.client_id.clone(),
                scope: token.scope.clone(),
                created_at: OffsetDateTime::now_utc(),
                // Rotation replaces the credential without extending the
                // grant's lifetime.
                expires_at: token.expires_at,
                revoked_at: None,
            };
            self.refresh_token_storage.create(&record).await?;
            response = response.with_refresh_token(replacement);
        }

        info!(
            client_id = %client.client_id,
            user_id = %user.id,
            rotated = self.config.rotate_refresh_tokens,
            "refreshed access token"
        );
        Ok(response)
    }

    /// Revokes a refresh token by its raw value.
    ///
    /// Idempotent: unknown or already-revoked tokens are a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage operation fails.
    pub async fn revoke_refresh_token(&self, raw_token: &str) -> AuthResult<()> {
        self.refresh_token_storage
            .revoke(&RefreshToken::hash_token(raw_token))
            .await?;
        Ok(())
    }

    /// Validates a bearer access token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` for any invalid token: bad signature,
    /// foreign algorithm, expired, or malformed.
    pub fn verify_access_token(&self, token: &str) -> AuthResult<AccessTokenClaims> {
        self.jwt_service
            .decode(token)
            .map_err(|e| AuthError::unauthenticated(e.to_string()))
    }

    async fn find_user(&self, user_id: Uuid) -> AuthResult<User> {
        // A grant always references a stored user; a miss is a data
        // integrity fault, not a client error.
        self.user_storage
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::internal("user referenced by grant no longer exists"))
    }

    fn mint_access_token(
        &self,
        user: &User,
        client: &Client,
        scope: ScopeSet,
    ) -> AuthResult<String> {
        let claims = AccessTokenClaims::new(
            self.jwt_service.issuer(),
            user.id,
            user.email.clone(),
            client.client_id.clone(),
            scope,
            self.config.access_token_lifetime,
        );
        self.jwt_service
            .encode(&claims)
            .map_err(|e| AuthError::internal(format!("failed to sign access token: {e}")))
    }

    async fn issue_refresh_token(
        &self,
        user_id: Uuid,
        client_id: &str,
        scope: ScopeSet,
    ) -> AuthResult<String> {
        let raw = RefreshToken::generate_token();
        let now = OffsetDateTime::now_utc();
        let record = RefreshToken {
            id: Uuid::new_v4(),
            token_hash: RefreshToken::hash_token(&raw),
            user_id,
            client_id: client_id.to_string(),
            scope,
            created_at: now,
            expires_at: now + self.config.refresh_token_lifetime,
            revoked_at: None,
        };
        self.refresh_token_storage.create(&record).await?;
        Ok(raw)
    }

    fn token_response(&self, access_token: String, scope: ScopeSet) -> TokenResponse {
        let expires_in =
            u64::try_from(self.config.access_token_lifetime.whole_seconds()).unwrap_or(0);
        TokenResponse::new(access_token, expires_in, scope)
    }
}
