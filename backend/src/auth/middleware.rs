//! Session guard for protected pages.
//!
//! Resolves the session cookie to a live server-side session and hands it to the
//! handler as a read-only [`CurrentSession`] extension. Requests without one are
//! redirected to the login entry point before any protected work happens.

use crate::api::common::ApiResponse;
use crate::auth::models::CurrentSession;
use crate::config::LOGIN_PATH;
use crate::context::AppContext;
use crate::errors::AuthError;
use crate::services::session_service::{SESSION_COOKIE, SessionService};
use anyhow::Result;
use axum::{
    extract::{Extension, OriginalUri, Request},
    http::{StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Json, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::error;

/// Looks up the live session referenced by the request's session cookie.
pub async fn current_session(
    pool: &SqlitePool,
    ctx: &AppContext,
    jar: &CookieJar,
) -> Result<Option<CurrentSession>> {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let id = cookie.value();
    if id.is_empty() {
        return Ok(None);
    }

    let session = SessionService::new(pool, ctx.config.session_ttl_seconds)
        .load(id)
        .await?;

    Ok(session.map(|session| CurrentSession {
        id: id.to_string(),
        session,
    }))
}

/// Session-required middleware
pub async fn require_session(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<Arc<AppContext>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    match current_session(&pool, &ctx, &jar).await {
        Ok(Some(current)) => {
            request.extensions_mut().insert(current);
            next.run(request).await
        }
        Ok(None) => {
            let uri = request
                .extensions()
                .get::<OriginalUri>()
                .map(|original| original.0.clone())
                .unwrap_or_else(|| request.uri().clone());
            Redirect::to(&login_redirect(&uri)).into_response()
        }
        Err(e) => {
            error!("Session lookup failed: {:#}", e);
            let error = AuthError::store_unavailable(e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::<()>::from(&error)),
            )
                .into_response()
        }
    }
}

/// Login URL that returns to `uri` after sign-in.
pub fn login_redirect(uri: &Uri) -> String {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    if is_login_path(target) || target == "/" {
        LOGIN_PATH.to_string()
    } else {
        format!("{}?next={}", LOGIN_PATH, urlencoding::encode(target))
    }
}

/// True when `target` points at the login entry point itself.
pub fn is_login_path(target: &str) -> bool {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/') == LOGIN_PATH
}

/// Post-login destination: `next` when it is a safe local path, otherwise `landing`.
///
/// Rejects absolute URLs, protocol-relative `//host` forms, backslashes, the login
/// entry point and the logout endpoint.
pub fn redirect_target(next: Option<&str>, landing: &str) -> String {
    match next.map(str::trim) {
        Some(next)
            if next.starts_with('/')
                && !next.starts_with("//")
                && !next.contains('\\')
                && !next.chars().any(char::is_control)
                && !is_login_path(next)
                && !next.starts_with("/logout") =>
        {
            next.to_string()
        }
        _ => landing.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_target() {
        assert_eq!(redirect_target(None, "/dashboard"), "/dashboard");
        assert_eq!(
            redirect_target(Some("/campaigns?status=active"), "/dashboard"),
            "/campaigns?status=active"
        );
        assert_eq!(redirect_target(Some("/login"), "/dashboard"), "/dashboard");
        assert_eq!(redirect_target(Some("/login/?x=1"), "/dashboard"), "/dashboard");
        assert_eq!(redirect_target(Some("/logout"), "/dashboard"), "/dashboard");
        assert_eq!(
            redirect_target(Some("https://evil.example"), "/dashboard"),
            "/dashboard"
        );
        assert_eq!(redirect_target(Some("//evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(redirect_target(Some("/\\evil.example"), "/dashboard"), "/dashboard");
        assert_eq!(redirect_target(Some(""), "/dashboard"), "/dashboard");
    }

    #[test]
    fn test_login_redirect() {
        let uri: Uri = "/api/session?verbose=1".parse().unwrap();
        assert_eq!(
            login_redirect(&uri),
            "/login?next=%2Fapi%2Fsession%3Fverbose%3D1"
        );

        let uri: Uri = "/login".parse().unwrap();
        assert_eq!(login_redirect(&uri), "/login");
    }

    #[test]
    fn test_is_login_path() {
        assert!(is_login_path("/login"));
        assert!(is_login_path("/login/"));
        assert!(is_login_path("/login?next=/x"));
        assert!(!is_login_path("/logins"));
        assert!(!is_login_path("/dashboard"));
    }
}
