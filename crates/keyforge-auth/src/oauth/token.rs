//! Token endpoint types.
//!
//! This module provides types for the OAuth 2.0 token endpoint,
//! including request parsing, response generation, and error handling.
//!
//! # Supported Grant Types
//!
//! - `authorization_code` - Exchange authorization code for tokens
//! - `refresh_token` - Refresh an access token

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;
use crate::types::ScopeSet;

/// Token request parameters.
///
/// This structure handles both grant types. Different fields are
/// required depending on the `grant_type`:
///
/// - `authorization_code`: code, redirect_uri
/// - `refresh_token`: refresh_token
///
/// # Client Authentication
///
/// Clients authenticate using one of:
/// - HTTP Basic Auth header (not in this struct)
/// - `client_id` + `client_secret` in body
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type.
    /// Required. One of: "authorization_code", "refresh_token"
    pub grant_type: String,

    /// Authorization code (for authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Redirect URI (must match authorization request).
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Client ID (for client_secret_post authentication).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Refresh token (for refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Requested scope. Accepted for compatibility and ignored; the
    /// refresh grant reuses the originally granted scope verbatim.
    #[serde(default)]
    pub scope: Option<String>,
}

/// Successful token response.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "bearer",
///   "expires_in": 3600,
///   "scope": "read write",
///   "refresh_token": "abc123..."
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token (JWT).
    pub access_token: String,

    /// Token type, always "bearer".
    pub token_type: String,

    /// Access token lifetime in seconds.
    pub expires_in: u64,

    /// Granted scopes (space-separated).
    pub scope: ScopeSet,

    /// Refresh token. Always present for the authorization_code grant;
    /// present on refresh only when rotation is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response with required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64, scope: ScopeSet) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
            expires_in,
            scope,
            refresh_token: None,
        }
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: String) -> Self {
        self.refresh_token = Some(token);
        self
    }
}

/// Token error response.
///
/// # Example Response
///
/// ```json
/// {
///   "error": "invalid_grant",
///   "error_description": "authorization code expired"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenError {
    /// OAuth 2.0 error code.
    pub error: TokenErrorCode,

    /// Human-readable error description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl TokenError {
    /// Creates a new token error.
    #[must_use]
    pub fn new(error: TokenErrorCode) -> Self {
        Self {
            error,
            error_description: None,
        }
    }

    /// Creates a new token error with description.
    #[must_use]
    pub fn with_description(error: TokenErrorCode, description: impl Into<String>) -> Self {
        Self {
            error,
            error_description: Some(description.into()),
        }
    }

    /// Creates an invalid_request error.
    #[must_use]
    pub fn invalid_request(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidRequest, description)
    }

    /// Creates an invalid_client error.
    #[must_use]
    pub fn invalid_client(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidClient, description)
    }

    /// Creates an invalid_grant error.
    #[must_use]
    pub fn invalid_grant(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::InvalidGrant, description)
    }

    /// Creates an unsupported_grant_type error.
    #[must_use]
    pub fn unsupported_grant_type(description: impl Into<String>) -> Self {
        Self::with_description(TokenErrorCode::UnsupportedGrantType, description)
    }
}

impl From<&AuthError> for TokenError {
    fn from(err: &AuthError) -> Self {
        let code = match err {
            AuthError::InvalidClient { .. } => TokenErrorCode::InvalidClient,
            AuthError::InvalidGrant { .. } => TokenErrorCode::InvalidGrant,
            AuthError::UnsupportedGrantType { .. } => TokenErrorCode::UnsupportedGrantType,
            AuthError::InvalidRequest { .. }
            | AuthError::InvalidRedirectUri { .. }
            | AuthError::Unauthenticated { .. } => TokenErrorCode::InvalidRequest,
            AuthError::Storage { .. }
            | AuthError::Configuration { .. }
            | AuthError::Internal { .. } => TokenErrorCode::ServerError,
        };

        // Server faults never leak internals to the wire.
        if code == TokenErrorCode::ServerError {
            Self::new(TokenErrorCode::ServerError)
        } else {
            Self::with_description(code, err.to_string())
        }
    }
}

/// OAuth 2.0 token error codes.
///
/// Defined in RFC 6749 Section 5.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenErrorCode {
    /// The request is missing a required parameter, includes an unsupported
    /// parameter value, or is otherwise malformed.
    InvalidRequest,

    /// Client authentication failed (unknown client, no client authentication
    /// included, or unsupported authentication method).
    InvalidClient,

    /// The provided authorization grant or refresh token is invalid, expired,
    /// revoked, or was issued to another client.
    InvalidGrant,

    /// The authorization grant type is not supported by the authorization server.
    UnsupportedGrantType,

    /// The server encountered an unexpected condition.
    ServerError,
}

impl TokenErrorCode {
    /// Returns the string representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::ServerError => 500,
            Self::InvalidRequest | Self::InvalidGrant | Self::UnsupportedGrantType => 400,
        }
    }
}

impl fmt::Display for TokenErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_deserialization() {
        let json = r#"{
            "grant_type": "authorization_code",
            "code": "SplxlOBeZQQYbYS6WxSbIA",
            "redirect_uri": "https://app.example.com/callback",
            "client_id": "my-app",
            "client_secret": "kf_secret"
        }"#;

        let request: TokenRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code, Some("SplxlOBeZQQYbYS6WxSbIA".to_string()));
        assert_eq!(
            request.redirect_uri,
            Some("https://app.example.com/callback".to_string())
        );
        assert!(request.refresh_token.is_none());
    }

    #[test]
    fn test_token_response_serialization() {
        let response = TokenResponse::new("jwt".to_string(), 3600, ScopeSet::parse("read"))
            .with_refresh_token("rt".to_string());

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token_type"], "bearer");
        assert_eq!(json["expires_in"], 3600);
        assert_eq!(json["scope"], "read");
        assert_eq!(json["refresh_token"], "rt");
    }

    #[test]
    fn test_token_response_omits_absent_refresh_token() {
        let response = TokenResponse::new("jwt".to_string(), 3600, ScopeSet::new());
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("refresh_token").is_none());
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(TokenErrorCode::InvalidClient.http_status(), 401);
        assert_eq!(TokenErrorCode::InvalidGrant.http_status(), 400);
        assert_eq!(TokenErrorCode::ServerError.http_status(), 500);

        let err = TokenError::from(&AuthError::invalid_grant("code expired"));
        assert_eq!(err.error, TokenErrorCode::InvalidGrant);
        assert!(err.error_description.is_some());
    }

    #[test]
    fn test_server_errors_carry_no_description() {
        let err = TokenError::from(&AuthError::storage("connection pool exhausted"));
        assert_eq!(err.error, TokenErrorCode::ServerError);
        assert!(err.error_description.is_none());
    }
}
