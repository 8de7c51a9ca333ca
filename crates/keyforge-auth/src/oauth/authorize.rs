//! Authorization endpoint types.

use serde::Deserialize;

use crate::error::AuthError;

/// Authorization request parameters.
///
/// All fields arrive as optional so that validation can produce precise
/// errors instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationRequest {
    /// OAuth 2.0 response type. Must be "code".
    #[serde(default)]
    pub response_type: Option<String>,

    /// Client identifier.
    #[serde(default)]
    pub client_id: Option<String>,

    /// Redirect URI; must exactly match one registered for the client.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// Requested scopes (space-delimited).
    #[serde(default)]
    pub scope: Option<String>,

    /// Opaque client state, echoed back on the redirect.
    #[serde(default)]
    pub state: Option<String>,
}

/// Successful authorization outcome: the code and the state to echo.
#[derive(Debug, Clone)]
pub struct AuthorizationResponse {
    /// The issued authorization code value.
    pub code: String,

    /// State from the authorization request, echoed verbatim.
    pub state: Option<String>,
}

impl AuthorizationResponse {
    /// Builds the redirect URL delivering the code to the client.
    ///
    /// The `state` parameter is appended only when the client supplied
    /// one, and is echoed byte-for-byte.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if the redirect URI fails to parse; callers
    /// validate it against the registration before reaching this point.
    pub fn to_redirect_url(&self, redirect_uri: &str) -> Result<String, AuthError> {
        let mut url = url::Url::parse(redirect_uri)
            .map_err(|e| AuthError::internal(format!("validated redirect URI unparseable: {e}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", &self.code);
            if let Some(state) = &self.state {
                pairs.append_pair("state", state);
            }
        }

        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_url_with_state() {
        let response = AuthorizationResponse {
            code: "abc123".to_string(),
            state: Some("xyz 789".to_string()),
        };

        let url = response
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();
        assert_eq!(
            url,
            "https://app.example.com/callback?code=abc123&state=xyz+789"
        );
    }

    #[test]
    fn test_redirect_url_without_state() {
        let response = AuthorizationResponse {
            code: "abc123".to_string(),
            state: None,
        };

        let url = response
            .to_redirect_url("https://app.example.com/callback")
            .unwrap();
        assert_eq!(url, "https://app.example.com/callback?code=abc123");
    }

    #[test]
    fn test_redirect_url_preserves_existing_query() {
        let response = AuthorizationResponse {
            code: "abc".to_string(),
            state: None,
        };

        let url = response
            .to_redirect_url("https://app.example.com/cb?tenant=t1")
            .unwrap();
        assert_eq!(url, "https://app.example.com/cb?tenant=t1&code=abc");
    }
}
