//! Keyforge OAuth 2.0 authorization server.
//!
//! Wires the grant engine from `keyforge-auth` over the in-memory
//! storage backends and exposes it as an axum application.

pub mod config;
pub mod observability;
pub mod routes;

pub use config::{ServerConfig, load_config};
pub use routes::{AppContext, build_router};
