//! OAuth 2.0 grant engine for the Keyforge authorization server.
//!
//! Implements the authorization code and refresh token grants for
//! confidential clients:
//!
//! - Argon2id credential hashing for user passwords and client secrets
//! - Single-use authorization codes with atomic redemption
//! - Refresh tokens stored only as SHA-256 hashes, with optional rotation
//! - HS256 access tokens with the algorithm pinned at validation
//!
//! Storage is abstracted behind traits in [`storage`]; services receive
//! their backends by injection, so engines over different stores can
//! coexist in one process.

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod secret;
pub mod storage;
pub mod token;
pub mod types;

pub use config::{AuthConfig, ConfigError, OAuthConfig};
pub use error::{AuthError, ErrorCategory};
pub use oauth::{AuthorizationService, ClientRegistry, TokenRequest, TokenResponse};
pub use token::{AccessTokenClaims, JwtService, TokenService};

/// Result alias used throughout the crate.
pub type AuthResult<T> = Result<T, AuthError>;
