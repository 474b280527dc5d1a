//! Server-rendered pages for the login flow.
//!
//! Templates are registered once at startup. Handlebars escapes every `{{value}}`
//! for HTML, so user-supplied text never needs manual escaping.

use crate::auth::models::Session;
use crate::config::LOGIN_PATH;
use crate::errors::{AuthError, AuthResult};
use axum::response::Html;
use handlebars::{Handlebars, TemplateError};
use serde_json::json;

const LOGIN_TEMPLATE: &str = "login";
const DASHBOARD_TEMPLATE: &str = "dashboard";

const LOGIN_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Sign in - Safety Campaign Console</title></head>
<body>
<main class="login">
<h1>Safety Campaign Console</h1>
{{#if error}}<div class="alert alert-error">{{error}}</div>{{/if}}
<form method="post" action="{{action}}">
{{#if next}}<input type="hidden" name="next" value="{{next}}">{{/if}}
<label for="identifier">Email or username</label>
<input id="identifier" name="identifier" type="text" value="{{identifier}}" autocomplete="username" required>
<label for="password">Password</label>
<input id="password" name="password" type="password" autocomplete="current-password" required>
<label><input type="checkbox" name="remember_me" value="1"> Remember me</label>
<button type="submit">Sign in</button>
</form>
</main>
</body>
</html>"#;

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>Dashboard - Safety Campaign Console</title></head>
<body>
<header>
<span class="avatar">{{avatar}}</span>
<span class="user">{{name}}</span>
<span class="role">{{role}}</span>
<a href="/logout">Sign out</a>
</header>
{{#if login_success}}<div class="alert alert-success">Signed in successfully.</div>{{/if}}
<main><h1>Welcome, {{name}}</h1></main>
</body>
</html>"#;

/// Registry of the console's page templates.
pub struct Views {
    registry: Handlebars<'static>,
}

impl Views {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(LOGIN_TEMPLATE, LOGIN_HTML)?;
        registry.register_template_string(DASHBOARD_TEMPLATE, DASHBOARD_HTML)?;
        Ok(Self { registry })
    }

    fn render(&self, template: &str, data: &serde_json::Value) -> AuthResult<Html<String>> {
        self.registry
            .render(template, data)
            .map(Html)
            .map_err(|e| AuthError::internal_error(format!("failed to render {}: {}", template, e)))
    }

    /// Login form. The password field is never pre-filled.
    pub fn login_page(
        &self,
        error: Option<&str>,
        identifier: &str,
        next: Option<&str>,
    ) -> AuthResult<Html<String>> {
        let data = json!({
            "action": LOGIN_PATH,
            "error": error,
            "identifier": identifier,
            "next": next.filter(|next| !next.is_empty()),
        });
        self.render(LOGIN_TEMPLATE, &data)
    }

    /// Default landing page for an authenticated session.
    pub fn dashboard_page(&self, session: &Session, login_success: bool) -> AuthResult<Html<String>> {
        let name = if session.name.is_empty() {
            &session.email
        } else {
            &session.name
        };

        let data = json!({
            "avatar": session.avatar,
            "name": name,
            "role": session.role,
            "login_success": login_success,
        });
        self.render(DASHBOARD_TEMPLATE, &data)
    }
}
