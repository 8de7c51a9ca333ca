//! JWT access token generation and validation.
//!
//! Access tokens are signed with HS256 using a server-held secret. The
//! algorithm is pinned on both paths: tokens are always minted as HS256
//! and the validator only accepts HS256, so a token asserting any other
//! algorithm in its header is rejected regardless of its signature.
//!
//! ## Example
//!
//! ```ignore
//! use keyforge_auth::token::jwt::{AccessTokenClaims, JwtService};
//!
//! let jwt_service = JwtService::new(b"signing-secret", "https://auth.example.com");
//!
//! let token = jwt_service.encode(&claims)?;
//! let claims = jwt_service.decode(&token)?;
//! ```

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::types::ScopeSet;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token claims are invalid.
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Claims
// ============================================================================

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Issuer (this authorization server).
    pub iss: String,

    /// Subject: the resource owner's user id.
    pub sub: String,

    /// The resource owner's email.
    pub email: String,

    /// Client the token was issued to.
    pub client_id: String,

    /// Granted scopes.
    pub scope: ScopeSet,

    /// Issued-at time (Unix timestamp).
    pub iat: i64,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Unique token identifier.
    pub jti: String,
}

impl AccessTokenClaims {
    /// Builds claims for a new access token.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        user_id: Uuid,
        email: impl Into<String>,
        client_id: impl Into<String>,
        scope: ScopeSet,
        lifetime: Duration,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            iss: issuer.into(),
            sub: user_id.to_string(),
            email: email.into(),
            client_id: client_id.into(),
            scope,
            iat: now.unix_timestamp(),
            exp: (now + lifetime).unix_timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

// ============================================================================
// JWT Service
// ============================================================================

/// HS256 access token signer and validator.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Creates a new JWT service from the shared signing secret.
    ///
    /// The validator is pinned to HS256 and checks `exp` and `iss`.
    #[must_use]
    pub fn new(secret: &[u8], issuer: impl Into<String>) -> Self {
        let issuer = issuer.into();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&issuer]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            issuer,
        }
    }

    /// Returns the issuer identifier baked into minted tokens.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Signs the given claims into a compact JWT.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if serialization or signing fails.
    pub fn encode(&self, claims: &AccessTokenClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Validates a compact JWT and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature does not verify, the header
    /// asserts an algorithm other than HS256, the token is expired, or
    /// the issuer does not match.
    pub fn decode(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
