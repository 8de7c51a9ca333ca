//! Authorization endpoint handlers.
//!
//! `GET /oauth/authorize` validates the request and renders the login
//! form; `POST /oauth/authorize` processes the login and redirects back
//! to the client with a code. Validation failures render an error page
//! directly: errors are never delivered to an unvalidated redirect URI.

use std::sync::Arc;

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::http::templates;
use crate::oauth::service::AuthorizationService;
use crate::oauth::{AuthorizationRequest, AuthorizationResponse};

/// State required for the authorization endpoint.
#[derive(Clone)]
pub struct AuthorizeState {
    /// Service handling validation, login, and code issuance.
    pub authorization_service: Arc<AuthorizationService>,
}

/// Query parameters for the login page.
///
/// The OAuth parameters plus an optional `error` set when a failed
/// login redirects back to the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizePageParams {
    #[serde(default)]
    response_type: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    state: Option<String>,
    /// Error message from a previous login attempt.
    #[serde(default)]
    error: Option<String>,
}

impl AuthorizePageParams {
    fn to_request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: self.response_type.clone(),
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope: self.scope.clone(),
            state: self.state.clone(),
        }
    }
}

/// Login form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    /// Resource owner email.
    pub email: String,
    /// Resource owner password.
    pub password: String,
    #[serde(default)]
    response_type: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    redirect_uri: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl LoginForm {
    fn to_request(&self) -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: self.response_type.clone(),
            client_id: self.client_id.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope: self.scope.clone(),
            state: self.state.clone(),
        }
    }
}

/// `GET /oauth/authorize` - renders the login form.
pub async fn authorize_page(
    State(state): State<AuthorizeState>,
    Query(params): Query<AuthorizePageParams>,
) -> Response {
    let request = params.to_request();

    match state.authorization_service.validate(&request).await {
        Ok(client) => Html(templates::render_login_form(
            &client.name,
            &request,
            params.error.as_deref(),
        ))
        .into_response(),
        Err(e) => {
            debug!(error = %e, "authorization request rejected");
            error_page_response(&e)
        }
    }
}

/// `POST /oauth/authorize` - processes the login.
///
/// On success, redirects to the client's redirect URI with `code` and
/// the echoed `state`. A wrong email or password redirects back to the
/// login form with an `error` query parameter; everything else renders
/// the error page.
pub async fn authorize_submit(
    State(state): State<AuthorizeState>,
    Form(form): Form<LoginForm>,
) -> Response {
    let request = form.to_request();

    match state
        .authorization_service
        .login(&request, &form.email, &form.password)
        .await
    {
        Ok(code) => {
            let response = AuthorizationResponse {
                code: code.code,
                state: request.state.clone(),
            };
            match response.to_redirect_url(&code.redirect_uri) {
                Ok(url) => Redirect::to(&url).into_response(),
                Err(e) => {
                    warn!(error = %e, "failed to build redirect URL");
                    error_page_response(&e)
                }
            }
        }
        Err(AuthError::Unauthenticated { message }) => {
            Redirect::to(&login_retry_url(&request, &message)).into_response()
        }
        Err(e) => {
            debug!(error = %e, "login rejected");
            error_page_response(&e)
        }
    }
}

/// Builds the URL that sends a failed login back to the form.
fn login_retry_url(request: &AuthorizationRequest, error: &str) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    if let Some(v) = &request.response_type {
        serializer.append_pair("response_type", v);
    }
    if let Some(v) = &request.client_id {
        serializer.append_pair("client_id", v);
    }
    if let Some(v) = &request.redirect_uri {
        serializer.append_pair("redirect_uri", v);
    }
    if let Some(v) = &request.scope {
        serializer.append_pair("scope", v);
    }
    if let Some(v) = &request.state {
        serializer.append_pair("state", v);
    }
    serializer.append_pair("error", error);
    format!("/oauth/authorize?{}", serializer.finish())
}

fn error_page_response(error: &AuthError) -> Response {
    let (status, description) = if error.is_server_error() {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal server error".to_string(),
        )
    } else {
        (StatusCode::BAD_REQUEST, error.to_string())
    };

    (
        status,
        Html(templates::render_error_page(
            error.oauth_error_code(),
            &description,
        )),
    )
        .into_response()
}
