//! In-memory storage backends for the Keyforge authorization server.
//!
//! Implements the `keyforge-auth` storage traits over `tokio`-guarded
//! hash maps. Suitable for development, demos, and integration tests;
//! all data is lost on restart.
//!
//! The authorization-code consume operation performs its
//! check-and-mark as a single transition under one write lock, so a
//! code can be redeemed at most once even under concurrent exchanges.

pub mod auth_code;
pub mod client;
pub mod refresh_token;
pub mod user;

pub use auth_code::InMemoryAuthorizationCodeStorage;
pub use client::InMemoryClientStorage;
pub use refresh_token::InMemoryRefreshTokenStorage;
pub use user::InMemoryUserStorage;
