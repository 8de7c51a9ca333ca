//! OAuth 2.0 Client domain types.
//!
//! This module defines the `Client` struct and related types for OAuth 2.0
//! client registrations. All clients are confidential: every registration
//! carries a hashed secret and must authenticate at the token endpoint.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// Grant Type
// =============================================================================

/// OAuth 2.0 grant types supported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Authorization Code flow.
    AuthorizationCode,
    /// Refresh Token flow.
    RefreshToken,
}

impl GrantType {
    /// Returns the OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
        }
    }

    /// Parses an OAuth 2.0 grant_type parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Client
// =============================================================================

/// OAuth 2.0 Client registration.
///
/// The raw secret is returned exactly once at registration time; only the
/// Argon2 hash is stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Argon2 PHC hash of the client secret.
    #[serde(default, skip_serializing)]
    pub secret_hash: String,

    /// Human-readable display name.
    pub name: String,

    /// Allowed redirect URIs for the authorization code flow.
    /// Fixed at registration; matching is exact string comparison.
    pub redirect_uris: Vec<String>,

    /// Timestamp when the client was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Client {
    /// Validates the client registration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration is invalid.
    pub fn validate(&self) -> Result<(), ClientValidationError> {
        if self.client_id.is_empty() {
            return Err(ClientValidationError::EmptyClientId);
        }

        if self.name.is_empty() {
            return Err(ClientValidationError::EmptyName);
        }

        if self.secret_hash.is_empty() {
            return Err(ClientValidationError::MissingSecret);
        }

        if self.redirect_uris.is_empty() {
            return Err(ClientValidationError::NoRedirectUris);
        }

        for uri in &self.redirect_uris {
            // Relative references are rejected; every registered URI must be
            // absolute so exact matching at authorization time is meaningful.
            if url::Url::parse(uri).is_err() {
                return Err(ClientValidationError::InvalidRedirectUri(uri.clone()));
            }
        }

        Ok(())
    }

    /// Checks if the given redirect URI is allowed for this client.
    ///
    /// Matching is exact; no prefix, substring, or normalization rules.
    #[must_use]
    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|allowed| allowed == uri)
    }
}

/// Client registration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientValidationError {
    /// The client ID is empty.
    #[error("client_id cannot be empty")]
    EmptyClientId,

    /// The client name is empty.
    #[error("client name cannot be empty")]
    EmptyName,

    /// The client has no secret hash.
    #[error("client must have a secret")]
    MissingSecret,

    /// The client has no redirect URIs.
    #[error("client must register at least one redirect URI")]
    NoRedirectUris,

    /// A redirect URI is not an absolute URI.
    #[error("invalid redirect URI: {0}")]
    InvalidRedirectUri(String),
}
