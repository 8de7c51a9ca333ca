//! Axum HTTP handlers for the grant engine.

pub mod authorize;
pub mod protected;
pub mod register;
pub mod templates;
pub mod token;

pub use authorize::{AuthorizeState, authorize_page, authorize_submit};
pub use protected::{ProtectedState, protected_handler};
pub use register::{
    RegisterClientRequest, RegisterClientResponse, RegisterUserRequest, RegisterUserResponse,
    RegistrationState, register_client_handler, register_user_handler,
};
pub use token::{TokenState, token_handler};
