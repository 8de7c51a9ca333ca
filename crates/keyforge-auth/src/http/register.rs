//! Registration endpoints for users and clients.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AuthError;
use crate::oauth::registry::ClientRegistry;
use crate::secret;
use crate::storage::UserStorage;
use crate::types::User;

/// State required for the registration endpoints.
#[derive(Clone)]
pub struct RegistrationState {
    /// Registry creating client registrations.
    pub registry: ClientRegistry,
    /// Storage for user self-registration.
    pub user_storage: Arc<dyn UserStorage>,
}

/// `POST /users` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    /// Login email; must be unused.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// `POST /users` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserResponse {
    /// Assigned user id.
    pub id: Uuid,
    /// Registered email.
    pub email: String,
}

/// `POST /clients` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterClientRequest {
    /// Human-readable client name.
    pub client_name: String,
    /// Absolute redirect URIs, fixed after registration.
    pub redirect_uris: Vec<String>,
}

/// `POST /clients` response body.
///
/// `client_secret` is the raw secret; it is returned here and never
/// again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterClientResponse {
    /// Assigned client id.
    pub client_id: String,
    /// Raw client secret. Shown exactly once.
    pub client_secret: String,
    /// Registered client name.
    pub client_name: String,
}

/// `POST /users` - registers a resource owner.
pub async fn register_user_handler(
    State(state): State<RegistrationState>,
    Json(request): Json<RegisterUserRequest>,
) -> Response {
    if request.email.is_empty() || request.password.is_empty() {
        return registration_error_response(&AuthError::invalid_request(
            "email and password are required",
        ));
    }

    match state.user_storage.find_by_email(&request.email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::CONFLICT,
                Json(ErrorBody::new("email already registered")),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => return registration_error_response(&e),
    }

    let password_hash = match secret::hash_password(&request.password) {
        Ok(hash) => hash,
        Err(e) => {
            return registration_error_response(&AuthError::internal(format!(
                "failed to hash password: {e}"
            )));
        }
    };

    let user = User::new(request.email, password_hash);
    if let Err(e) = state.user_storage.create(&user).await {
        return registration_error_response(&e);
    }

    info!(user_id = %user.id, "registered user");
    (
        StatusCode::CREATED,
        Json(RegisterUserResponse {
            id: user.id,
            email: user.email,
        }),
    )
        .into_response()
}

/// `POST /clients` - registers an OAuth client.
pub async fn register_client_handler(
    State(state): State<RegistrationState>,
    Json(request): Json<RegisterClientRequest>,
) -> Response {
    match state
        .registry
        .register(&request.client_name, request.redirect_uris)
        .await
    {
        Ok((client, raw_secret)) => (
            StatusCode::CREATED,
            Json(RegisterClientResponse {
                client_id: client.client_id,
                client_secret: raw_secret,
                client_name: client.name,
            }),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "client registration failed");
            registration_error_response(&e)
        }
    }
}

/// Generic JSON error body for the registration endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

fn registration_error_response(error: &AuthError) -> Response {
    if error.is_server_error() {
        warn!(error = %error, category = %error.category(), "registration failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("internal server error")),
        )
            .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(error.to_string())),
        )
            .into_response()
    }
}
