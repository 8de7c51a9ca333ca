//! Application wiring and router construction.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use keyforge_auth::http::{
    AuthorizeState, ProtectedState, RegistrationState, TokenState, authorize_page,
    authorize_submit, protected_handler, register_client_handler, register_user_handler,
    token_handler,
};
use keyforge_auth::oauth::{AuthorizationService, ClientRegistry};
use keyforge_auth::storage::{
    AuthorizationCodeStorage, ClientStorage, RefreshTokenStorage, UserStorage,
};
use keyforge_auth::token::JwtService;
use keyforge_auth::types::{Client, User};
use keyforge_auth::{AuthConfig, AuthResult, TokenService};
use keyforge_db_memory::{
    InMemoryAuthorizationCodeStorage, InMemoryClientStorage, InMemoryRefreshTokenStorage,
    InMemoryUserStorage,
};

use crate::config::BootstrapConfig;

/// Services and storages shared by all routes.
///
/// Storage handles stay accessible so the bootstrap seeder and tests
/// can reach past the HTTP surface.
#[derive(Clone)]
pub struct AppContext {
    pub user_storage: Arc<dyn UserStorage>,
    pub client_storage: Arc<dyn ClientStorage>,
    pub code_storage: Arc<dyn AuthorizationCodeStorage>,
    pub refresh_token_storage: Arc<dyn RefreshTokenStorage>,
    pub registry: ClientRegistry,
    pub authorization_service: Arc<AuthorizationService>,
    pub token_service: Arc<TokenService>,
}

impl AppContext {
    /// Builds the full service graph over in-memory storage.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let user_storage: Arc<dyn UserStorage> = Arc::new(InMemoryUserStorage::new());
        let client_storage: Arc<dyn ClientStorage> = Arc::new(InMemoryClientStorage::new());
        let code_storage: Arc<dyn AuthorizationCodeStorage> =
            Arc::new(InMemoryAuthorizationCodeStorage::new());
        let refresh_token_storage: Arc<dyn RefreshTokenStorage> =
            Arc::new(InMemoryRefreshTokenStorage::new());

        let jwt_service = Arc::new(JwtService::new(
            config.signing_key.as_bytes(),
            config.issuer.clone(),
        ));

        let registry = ClientRegistry::new(client_storage.clone());

        let authorization_service = Arc::new(AuthorizationService::new(
            client_storage.clone(),
            user_storage.clone(),
            code_storage.clone(),
            config.authorization_config(),
        ));

        let token_service = Arc::new(TokenService::new(
            jwt_service,
            code_storage.clone(),
            refresh_token_storage.clone(),
            user_storage.clone(),
            config.token_config(),
        ));

        Self {
            user_storage,
            client_storage,
            code_storage,
            refresh_token_storage,
            registry,
            authorization_service,
            token_service,
        }
    }

    /// Spawns a background task that sweeps expired codes and tokens.
    pub fn spawn_cleanup_task(&self, every: std::time::Duration) -> tokio::task::JoinHandle<()> {
        let code_storage = self.code_storage.clone();
        let refresh_token_storage = self.refresh_token_storage.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick fires immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match code_storage.cleanup_expired().await {
                    Ok(removed) if removed > 0 => {
                        info!(removed, "removed expired authorization codes");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "authorization code cleanup failed"),
                }
                match refresh_token_storage.cleanup_expired().await {
                    Ok(removed) if removed > 0 => {
                        info!(removed, "removed expired refresh tokens");
                    }
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "refresh token cleanup failed"),
                }
            }
        })
    }

    /// Seeds users and clients from the bootstrap configuration.
    ///
    /// Existing records with the same email or client id are left
    /// untouched, so restarts with the same configuration are safe.
    ///
    /// # Errors
    ///
    /// Returns an error if a seeded record fails validation or storage.
    pub async fn seed(&self, bootstrap: &BootstrapConfig) -> AuthResult<()> {
        for entry in &bootstrap.users {
            if self.user_storage.find_by_email(&entry.email).await?.is_some() {
                continue;
            }

            let user = User::new(entry.email.clone(), entry.password_hash.clone());
            self.user_storage.create(&user).await?;
            info!(email = %entry.email, "bootstrapped user");
        }

        for entry in &bootstrap.clients {
            if self
                .client_storage
                .find_by_client_id(&entry.client_id)
                .await?
                .is_some()
            {
                continue;
            }

            let client = Client {
                client_id: entry.client_id.clone(),
                secret_hash: entry.secret_hash.clone(),
                name: entry.name.clone(),
                redirect_uris: entry.redirect_uris.clone(),
                created_at: OffsetDateTime::now_utc(),
            };
            client
                .validate()
                .map_err(|e| keyforge_auth::AuthError::configuration(e.to_string()))?;

            self.client_storage.create(&client).await?;
            info!(client_id = %entry.client_id, "bootstrapped client");
        }

        Ok(())
    }

    /// Builds the HTTP router over this context.
    #[must_use]
    pub fn router(&self) -> Router {
        build_router(self)
    }
}

/// Assembles the application router.
pub fn build_router(ctx: &AppContext) -> Router {
    let registration_state = RegistrationState {
        registry: ctx.registry.clone(),
        user_storage: ctx.user_storage.clone(),
    };

    let authorize_state = AuthorizeState {
        authorization_service: ctx.authorization_service.clone(),
    };

    let token_state = TokenState {
        token_service: ctx.token_service.clone(),
        registry: ctx.registry.clone(),
    };

    let protected_state = ProtectedState {
        token_service: ctx.token_service.clone(),
    };

    Router::new()
        .route("/health", get(health))
        .merge(
            Router::new()
                .route("/users", post(register_user_handler))
                .route("/clients", post(register_client_handler))
                .with_state(registration_state),
        )
        .merge(
            Router::new()
                .route("/oauth/authorize", get(authorize_page).post(authorize_submit))
                .with_state(authorize_state),
        )
        .merge(
            Router::new()
                .route("/oauth/token", post(token_handler))
                .with_state(token_state),
        )
        .merge(
            Router::new()
                .route("/protected", get(protected_handler))
                .with_state(protected_state),
        )
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
