//! Server configuration.
//!
//! Loaded from a TOML file plus `KEYFORGE_`-prefixed environment
//! overrides (double underscore as section separator, e.g.
//! `KEYFORGE_AUTH__SIGNING_KEY`).

use serde::{Deserialize, Serialize};

use keyforge_auth::AuthConfig;

/// Root server configuration.
///
/// # Example (TOML)
///
/// ```toml
/// listen = "127.0.0.1:8080"
///
/// [auth]
/// issuer = "https://auth.example.com"
/// signing_key = "0123456789abcdef0123456789abcdef"
///
/// [[bootstrap.users]]
/// email = "admin@example.com"
/// password_hash = "$argon2id$..."
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub listen: String,

    /// Auth module configuration.
    pub auth: AuthConfig,

    /// Records seeded into storage at startup.
    pub bootstrap: BootstrapConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8080".to_string(),
            auth: AuthConfig::default(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

/// Startup seed data.
///
/// Storage is process-local, so initial users and clients come from
/// configuration. The `init-user` and `init-client` subcommands print
/// ready-made entries for these tables.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Users created at startup.
    pub users: Vec<BootstrapUser>,

    /// Clients created at startup.
    pub clients: Vec<BootstrapClient>,
}

/// A user seeded at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapUser {
    /// Login email.
    pub email: String,

    /// Argon2 PHC hash of the password (never the plaintext).
    pub password_hash: String,
}

/// A client seeded at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BootstrapClient {
    /// Client identifier.
    pub client_id: String,

    /// Display name.
    pub name: String,

    /// Registered redirect URIs.
    pub redirect_uris: Vec<String>,

    /// Argon2 PHC hash of the client secret.
    pub secret_hash: String,
}

/// Loads configuration from the given file and the environment.
///
/// The file is optional; environment variables alone can carry a full
/// configuration.
///
/// # Errors
///
/// Returns an error if the file or environment contents fail to parse.
pub fn load_config(path: &str) -> Result<ServerConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("KEYFORGE").separator("__"))
        .build()?
        .try_deserialize()
}
