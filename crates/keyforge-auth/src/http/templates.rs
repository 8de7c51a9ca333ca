//! HTML templates for the authorize flow.
//!
//! Server-rendered login and error pages. The login form carries the
//! authorization request parameters as hidden fields so the POST can
//! re-validate them.

use crate::oauth::AuthorizationRequest;

const SHARED_STYLES: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    background: #f1f3f5;
    min-height: 100vh;
    display: flex;
    justify-content: center;
    align-items: center;
    color: #212529;
    line-height: 1.5;
}

.container { width: 100%; max-width: 420px; padding: 1rem; }

.card {
    background: #ffffff;
    border: 1px solid #dee2e6;
    border-radius: 8px;
    padding: 1.5rem;
}

.card-title { font-size: 1.25rem; font-weight: 600; margin-bottom: 1rem; }

.form-group { margin-bottom: 1rem; }

.form-label {
    display: block;
    font-size: 0.875rem;
    font-weight: 500;
    margin-bottom: 0.25rem;
}

.form-input {
    width: 100%;
    padding: 0.625rem 0.75rem;
    border: 1px solid #ced4da;
    border-radius: 6px;
    font-size: 0.875rem;
}

.btn {
    width: 100%;
    padding: 0.625rem;
    border: none;
    border-radius: 6px;
    background: #3b5bdb;
    color: #ffffff;
    font-size: 0.875rem;
    font-weight: 600;
    cursor: pointer;
}

.alert {
    padding: 0.625rem 0.75rem;
    border-radius: 6px;
    background: #ffe3e3;
    color: #c92a2a;
    font-size: 0.875rem;
    margin-bottom: 1rem;
}

.error-code { font-size: 0.875rem; color: #868e96; margin-top: 0.5rem; }
"#;

/// Escapes HTML special characters.
fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Base HTML template wrapper.
fn html_page(title: &str, content: &str) -> String {
    let mut html = String::with_capacity(content.len() + 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("    <title>");
    html.push_str(&html_escape(title));
    html.push_str(" - Keyforge</title>\n");
    html.push_str("    <style>");
    html.push_str(SHARED_STYLES);
    html.push_str("</style>\n</head>\n<body>\n    <div class=\"container\">\n");
    html.push_str(content);
    html.push_str("\n    </div>\n</body>\n</html>");
    html
}

fn push_hidden_field(content: &mut String, name: &str, value: &str) {
    content.push_str("<input type=\"hidden\" name=\"");
    content.push_str(name);
    content.push_str("\" value=\"");
    content.push_str(&html_escape(value));
    content.push_str("\">\n");
}

/// Renders the login form.
///
/// The authorization request parameters are embedded as hidden fields;
/// the POST handler re-validates them before issuing a code.
pub fn render_login_form(
    client_name: &str,
    request: &AuthorizationRequest,
    error: Option<&str>,
) -> String {
    let mut content = String::with_capacity(2048);

    content.push_str("<div class=\"card\">\n");
    content.push_str("<div class=\"card-title\">Sign in to ");
    content.push_str(&html_escape(client_name));
    content.push_str("</div>\n\n");

    if let Some(e) = error {
        content.push_str("<div class=\"alert\">");
        content.push_str(&html_escape(e));
        content.push_str("</div>\n\n");
    }

    content.push_str("<form method=\"POST\" action=\"/oauth/authorize\">\n");
    push_hidden_field(
        &mut content,
        "response_type",
        request.response_type.as_deref().unwrap_or(""),
    );
    push_hidden_field(
        &mut content,
        "client_id",
        request.client_id.as_deref().unwrap_or(""),
    );
    push_hidden_field(
        &mut content,
        "redirect_uri",
        request.redirect_uri.as_deref().unwrap_or(""),
    );
    if let Some(scope) = &request.scope {
        push_hidden_field(&mut content, "scope", scope);
    }
    if let Some(state) = &request.state {
        push_hidden_field(&mut content, "state", state);
    }

    content.push_str("\n<div class=\"form-group\">\n");
    content.push_str("<label class=\"form-label\" for=\"email\">Email</label>\n");
    content.push_str("<input type=\"email\" id=\"email\" name=\"email\" class=\"form-input\" ");
    content.push_str("required autocomplete=\"username\">\n");
    content.push_str("</div>\n\n");

    content.push_str("<div class=\"form-group\">\n");
    content.push_str("<label class=\"form-label\" for=\"password\">Password</label>\n");
    content.push_str(
        "<input type=\"password\" id=\"password\" name=\"password\" class=\"form-input\" ",
    );
    content.push_str("required autocomplete=\"current-password\">\n");
    content.push_str("</div>\n\n");

    content.push_str("<button type=\"submit\" class=\"btn\">Sign in</button>\n");
    content.push_str("</form>\n</div>");

    html_page("Sign In", &content)
}

/// Renders a terminal error page.
///
/// Used for authorization failures that must not be delivered via
/// redirect (invalid client, unregistered redirect URI).
pub fn render_error_page(error_code: &str, description: &str) -> String {
    let mut content = String::with_capacity(512);

    content.push_str("<div class=\"card\">\n");
    content.push_str("<div class=\"card-title\">Authorization failed</div>\n");
    content.push_str("<p>");
    content.push_str(&html_escape(description));
    content.push_str("</p>\n<div class=\"error-code\">");
    content.push_str(&html_escape(error_code));
    content.push_str("</div>\n</div>");

    html_page("Error", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AuthorizationRequest {
        AuthorizationRequest {
            response_type: Some("code".to_string()),
            client_id: Some("client-1".to_string()),
            redirect_uri: Some("https://app.example.com/cb".to_string()),
            scope: Some("read".to_string()),
            state: Some("xyz".to_string()),
        }
    }

    #[test]
    fn test_login_form_carries_request_fields() {
        let html = render_login_form("Test App", &request(), None);
        assert!(html.contains("Sign in to Test App"));
        assert!(html.contains("name=\"client_id\" value=\"client-1\""));
        assert!(html.contains("name=\"state\" value=\"xyz\""));
        assert!(html.contains("name=\"email\""));
        assert!(!html.contains("alert"));
    }

    #[test]
    fn test_login_form_shows_error() {
        let html = render_login_form("Test App", &request(), Some("invalid email or password"));
        assert!(html.contains("invalid email or password"));
    }

    #[test]
    fn test_html_is_escaped() {
        let mut req = request();
        req.state = Some("\"><script>alert(1)</script>".to_string());
        let html = render_login_form("<b>App</b>", &req, None);
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;b&gt;App&lt;/b&gt;"));
    }

    #[test]
    fn test_error_page() {
        let html = render_error_page("invalid_request", "missing client_id parameter");
        assert!(html.contains("Authorization failed"));
        assert!(html.contains("missing client_id parameter"));
        assert!(html.contains("invalid_request"));
    }
}
