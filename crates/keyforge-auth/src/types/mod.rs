//! Domain types for the grant engine.

pub mod auth_code;
pub mod client;
pub mod refresh_token;
pub mod scope;
pub mod user;

pub use auth_code::AuthorizationCode;
pub use client::{Client, ClientValidationError, GrantType};
pub use refresh_token::RefreshToken;
pub use scope::ScopeSet;
pub use user::User;
