//! OAuth 2.0 token endpoint handler.
//!
//! Handles `POST /oauth/token` with an `application/x-www-form-urlencoded`
//! body. The client is authenticated before the grant is even looked at,
//! so probing grants with bad client credentials always yields
//! `invalid_client`.
//!
//! # Example
//!
//! ```ignore
//! POST /oauth/token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=authorization_code
//! &code=SplxlOBeZQQYbYS6WxSbIA
//! &redirect_uri=https://app.example.com/callback
//! &client_id=my-app
//! &client_secret=kf_...
//! ```

use std::sync::Arc;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use base64::Engine;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::oauth::registry::ClientRegistry;
use crate::oauth::token::{TokenError, TokenRequest, TokenResponse};
use crate::token::service::TokenService;
use crate::types::{Client, GrantType};

/// State required for the token endpoint.
#[derive(Clone)]
pub struct TokenState {
    /// Token service dispatching the grants.
    pub token_service: Arc<TokenService>,
    /// Registry authenticating the calling client.
    pub registry: ClientRegistry,
}

/// OAuth 2.0 token endpoint handler.
///
/// # Client Authentication
///
/// Clients authenticate using either:
/// - HTTP Basic Auth header: `Authorization: Basic <base64(client_id:client_secret)>`
/// - Request body: `client_id` and `client_secret` parameters
///
/// # Grant Types
///
/// - `authorization_code`: requires `code`, `redirect_uri`
/// - `refresh_token`: requires `refresh_token`
pub async fn token_handler(
    State(state): State<TokenState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    debug!(
        grant_type = %request.grant_type,
        client_id = ?request.client_id,
        "processing token request"
    );

    let client = match authenticate_client(&state.registry, &headers, &request).await {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "client authentication failed");
            return token_error_response(&e);
        }
    };

    let result = match GrantType::parse(&request.grant_type) {
        Some(GrantType::AuthorizationCode) => {
            state.token_service.exchange_code(&request, &client).await
        }
        Some(GrantType::RefreshToken) => state.token_service.refresh(&request, &client).await,
        None => {
            warn!(grant_type = %request.grant_type, "unsupported grant type");
            Err(AuthError::unsupported_grant_type(&request.grant_type))
        }
    };

    match result {
        Ok(response) => {
            info!(
                client_id = %client.client_id,
                grant_type = %request.grant_type,
                "token issued"
            );
            token_success_response(&response)
        }
        Err(e) => {
            warn!(
                client_id = %client.client_id,
                grant_type = %request.grant_type,
                error = %e,
                "token request failed"
            );
            token_error_response(&e)
        }
    }
}

/// Client credentials extracted from the request.
enum ClientAuth {
    /// HTTP Basic authentication.
    Basic {
        client_id: String,
        client_secret: String,
    },
    /// Client credentials in the request body.
    Body {
        client_id: String,
        client_secret: String,
    },
    /// No usable client credentials provided.
    None,
}

/// Extracts client credentials from headers and body.
///
/// The Basic header wins when both are present.
fn extract_client_auth(headers: &HeaderMap, request: &TokenRequest) -> ClientAuth {
    if let Some(auth_header) = headers.get("authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(basic_creds) = auth_str.strip_prefix("Basic ")
        && let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(basic_creds.trim())
        && let Ok(creds_str) = String::from_utf8(decoded)
        && let Some((client_id, client_secret)) = creds_str.split_once(':')
    {
        return ClientAuth::Basic {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        };
    }

    if let (Some(client_id), Some(client_secret)) =
        (request.client_id.as_ref(), request.client_secret.as_ref())
    {
        return ClientAuth::Body {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
        };
    }

    ClientAuth::None
}

/// Authenticates the calling client.
///
/// All clients are confidential; a request without a secret is rejected
/// outright.
async fn authenticate_client(
    registry: &ClientRegistry,
    headers: &HeaderMap,
    request: &TokenRequest,
) -> Result<Client, AuthError> {
    let (client_id, client_secret) = match extract_client_auth(headers, request) {
        ClientAuth::Basic {
            client_id,
            client_secret,
        }
        | ClientAuth::Body {
            client_id,
            client_secret,
        } => (client_id, client_secret),
        ClientAuth::None => {
            return Err(AuthError::invalid_client("no client credentials provided"));
        }
    };

    registry.authenticate(&client_id, &client_secret).await
}

/// Builds a successful token response.
///
/// Token responses carry credentials, so caches are told to drop them.
fn token_success_response(response: &TokenResponse) -> Response {
    (
        StatusCode::OK,
        [("Cache-Control", "no-store"), ("Pragma", "no-cache")],
        Json(response),
    )
        .into_response()
}

/// Builds an error response for the token endpoint.
fn token_error_response(error: &AuthError) -> Response {
    let token_error = TokenError::from(error);
    let status = StatusCode::from_u16(token_error.error.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        [("Cache-Control", "no-store"), ("Pragma", "no-cache")],
        Json(token_error),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> TokenRequest {
        TokenRequest {
            grant_type: "authorization_code".to_string(),
            code: None,
            redirect_uri: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
            scope: None,
        }
    }

    #[test]
    fn test_extract_basic_auth() {
        let mut headers = HeaderMap::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode("client-1:kf_secret");
        headers.insert("authorization", format!("Basic {encoded}").parse().unwrap());

        match extract_client_auth(&headers, &request()) {
            ClientAuth::Basic {
                client_id,
                client_secret,
            } => {
                assert_eq!(client_id, "client-1");
                assert_eq!(client_secret, "kf_secret");
            }
            _ => panic!("expected Basic auth"),
        }
    }

    #[test]
    fn test_extract_body_auth() {
        let mut req = request();
        req.client_id = Some("client-1".to_string());
        req.client_secret = Some("kf_secret".to_string());

        match extract_client_auth(&HeaderMap::new(), &req) {
            ClientAuth::Body {
                client_id,
                client_secret,
            } => {
                assert_eq!(client_id, "client-1");
                assert_eq!(client_secret, "kf_secret");
            }
            _ => panic!("expected body auth"),
        }
    }

    #[test]
    fn test_basic_auth_takes_precedence() {
        let mut headers = HeaderMap::new();
        let encoded = base64::engine::general_purpose::STANDARD.encode("header-client:secret-a");
        headers.insert("authorization", format!("Basic {encoded}").parse().unwrap());

        let mut req = request();
        req.client_id = Some("body-client".to_string());
        req.client_secret = Some("secret-b".to_string());

        match extract_client_auth(&headers, &req) {
            ClientAuth::Basic { client_id, .. } => assert_eq!(client_id, "header-client"),
            _ => panic!("expected Basic auth"),
        }
    }

    #[test]
    fn test_missing_credentials() {
        assert!(matches!(
            extract_client_auth(&HeaderMap::new(), &request()),
            ClientAuth::None
        ));

        // client_id without secret is not enough for a confidential client.
        let mut req = request();
        req.client_id = Some("client-1".to_string());
        assert!(matches!(
            extract_client_auth(&HeaderMap::new(), &req),
            ClientAuth::None
        ));
    }

    #[test]
    fn test_malformed_basic_header_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", "Basic not-base64!!".parse().unwrap());
        assert!(matches!(
            extract_client_auth(&headers, &request()),
            ClientAuth::None
        ));
    }
}
