//! Grant engine configuration.
//!
//! Deserializable configuration for the auth module. The server binary
//! loads this from its TOML file / environment and hands the relevant
//! pieces to the services.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::oauth::AuthorizationConfig;
use crate::token::TokenConfig;

/// Root auth configuration.
///
/// # Example (TOML)
///
/// ```toml
/// [auth]
/// issuer = "https://auth.example.com"
/// signing_key = "0123456789abcdef0123456789abcdef"
///
/// [auth.oauth]
/// access_token_lifetime = "1h"
/// refresh_token_lifetime = "7d"
/// refresh_token_rotation = false
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Server issuer URL (used in the token `iss` claim).
    pub issuer: String,

    /// HMAC secret for HS256 access token signing.
    /// Must be at least 32 bytes.
    pub signing_key: String,

    /// OAuth 2.0 configuration.
    pub oauth: OAuthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer: "http://localhost:8080".to_string(),
            signing_key: String::new(),
            oauth: OAuthConfig::default(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the issuer is empty or the signing key is
    /// missing or too short to be a useful HMAC secret.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::MissingIssuer);
        }

        if self.signing_key.len() < 32 {
            return Err(ConfigError::WeakSigningKey {
                length: self.signing_key.len(),
            });
        }

        Ok(())
    }

    /// Derives the authorization-endpoint configuration.
    #[must_use]
    pub fn authorization_config(&self) -> AuthorizationConfig {
        AuthorizationConfig {
            code_lifetime: to_time_duration(self.oauth.authorization_code_lifetime),
        }
    }

    /// Derives the token-endpoint configuration.
    #[must_use]
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            access_token_lifetime: to_time_duration(self.oauth.access_token_lifetime),
            refresh_token_lifetime: to_time_duration(self.oauth.refresh_token_lifetime),
            rotate_refresh_tokens: self.oauth.refresh_token_rotation,
        }
    }
}

/// OAuth 2.0 configuration.
///
/// Controls grant lifetimes and refresh token behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Authorization code lifetime.
    /// Codes should be short-lived for security.
    #[serde(with = "humantime_serde")]
    pub authorization_code_lifetime: Duration,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_token_lifetime: Duration,

    /// Refresh token lifetime.
    /// Can be longer since refresh tokens require client authentication.
    #[serde(with = "humantime_serde")]
    pub refresh_token_lifetime: Duration,

    /// Rotate refresh tokens on use.
    /// When enabled, a new refresh token is issued with each refresh and
    /// the presented one is revoked.
    pub refresh_token_rotation: bool,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            authorization_code_lifetime: Duration::from_secs(600), // 10 minutes
            access_token_lifetime: Duration::from_secs(3600),      // 1 hour
            refresh_token_lifetime: Duration::from_secs(7 * 24 * 3600), // 7 days
            refresh_token_rotation: false,
        }
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The issuer URL is empty.
    #[error("issuer must not be empty")]
    MissingIssuer,

    /// The signing key is too short.
    #[error("signing key must be at least 32 bytes, got {length}")]
    WeakSigningKey {
        /// Length of the configured key in bytes.
        length: usize,
    },
}

fn to_time_duration(d: Duration) -> time::Duration {
    time::Duration::try_from(d).unwrap_or_else(|_| time::Duration::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthConfig::default();
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(600)
        );
        assert_eq!(config.oauth.access_token_lifetime, Duration::from_secs(3600));
        assert_eq!(
            config.oauth.refresh_token_lifetime,
            Duration::from_secs(7 * 24 * 3600)
        );
        assert!(!config.oauth.refresh_token_rotation);
    }

    #[test]
    fn test_validate_requires_signing_key() {
        let config = AuthConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeakSigningKey { length: 0 })
        ));

        let config = AuthConfig {
            signing_key: "0123456789abcdef0123456789abcdef".to_string(),
            ..AuthConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_with_humantime_durations() {
        let toml = r#"
            issuer = "https://auth.example.com"
            signing_key = "0123456789abcdef0123456789abcdef"

            [oauth]
            access_token_lifetime = "30m"
            refresh_token_lifetime = "14d"
            refresh_token_rotation = true
        "#;

        let config: AuthConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.oauth.access_token_lifetime,
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            config.oauth.refresh_token_lifetime,
            Duration::from_secs(14 * 24 * 3600)
        );
        assert!(config.oauth.refresh_token_rotation);
        // Unset fields fall back to defaults.
        assert_eq!(
            config.oauth.authorization_code_lifetime,
            Duration::from_secs(600)
        );
    }

    #[test]
    fn test_derived_service_configs() {
        let config = AuthConfig::default();
        let token = config.token_config();
        assert_eq!(token.access_token_lifetime, time::Duration::hours(1));
        assert_eq!(token.refresh_token_lifetime, time::Duration::days(7));

        let authz = config.authorization_config();
        assert_eq!(authz.code_lifetime, time::Duration::minutes(10));
    }
}
