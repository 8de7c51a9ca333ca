//! OAuth 2.0 authorization flow components.

pub mod authorize;
pub mod registry;
pub mod service;
pub mod token;

pub use authorize::{AuthorizationRequest, AuthorizationResponse};
pub use registry::ClientRegistry;
pub use service::{AuthorizationConfig, AuthorizationService};
pub use token::{TokenError, TokenErrorCode, TokenRequest, TokenResponse};
