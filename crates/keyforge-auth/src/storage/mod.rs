//! Storage traits for the grant engine.
//!
//! Services depend on these traits via `Arc<dyn Trait>`, so backends can
//! be swapped without touching grant logic. An in-memory implementation
//! lives in the `keyforge-db-memory` crate.

pub mod auth_code;
pub mod client;
pub mod refresh_token;
pub mod user;

pub use auth_code::AuthorizationCodeStorage;
pub use client::ClientStorage;
pub use refresh_token::RefreshTokenStorage;
pub use user::UserStorage;
