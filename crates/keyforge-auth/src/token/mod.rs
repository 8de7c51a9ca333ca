//! Access token issuance and validation.

pub mod jwt;
pub mod service;

pub use jwt::{AccessTokenClaims, JwtError, JwtService};
pub use service::{TokenConfig, TokenService};
