//! Sample bearer-protected resource.
//!
//! Demonstrates access-token verification: `GET /protected` returns the
//! token's identity claims when presented with a valid bearer token.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::token::service::TokenService;
use crate::types::ScopeSet;

/// State required for the protected resource.
#[derive(Clone)]
pub struct ProtectedState {
    /// Service validating bearer tokens.
    pub token_service: Arc<TokenService>,
}

/// Identity claims echoed back to an authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedResponse {
    /// Resource owner id (`sub` claim).
    pub user_id: String,
    /// Resource owner email.
    pub email: String,
    /// Client the token was issued to.
    pub client_id: String,
    /// Granted scopes.
    pub scope: ScopeSet,
}

/// `GET /protected` - returns the caller's token claims.
pub async fn protected_handler(
    State(state): State<ProtectedState>,
    headers: HeaderMap,
) -> Response {
    let Some(token) = extract_bearer_token(&headers) else {
        return unauthorized_response("missing bearer token");
    };

    match state.token_service.verify_access_token(token) {
        Ok(claims) => Json(ProtectedResponse {
            user_id: claims.sub,
            email: claims.email,
            client_id: claims.client_id,
            scope: claims.scope,
        })
        .into_response(),
        Err(e) => {
            debug!(error = %e, "bearer token rejected");
            unauthorized_response("invalid access token")
        }
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn unauthorized_response(description: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(
            header::WWW_AUTHENTICATE,
            format!("Bearer error=\"invalid_token\", error_description=\"{description}\""),
        )],
        Json(serde_json::json!({ "error": "invalid_token", "error_description": description })),
    )
        .into_response()
}
