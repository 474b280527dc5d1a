//! Handler functions for the login entry point, logout and the landing page.
//!
//! These functions read the form or cookies, delegate to
//! [`Authenticator`](crate::auth::service::Authenticator) and translate the outcome into
//! redirects, cookies and rendered pages. Error detail never reaches a response body.

use crate::auth::middleware::{current_session, is_login_path, redirect_target};
use crate::auth::models::{CurrentSession, LoginForm, LoginQuery};
use crate::auth::service::Authenticator;
use crate::config::{Config, LOGIN_PATH};
use crate::context::AppContext;
use crate::errors::AuthResult;
use crate::services::session_service::{SESSION_COOKIE, SessionService};
use crate::utils::remember_token::{REMEMBER_TOKEN_COOKIE, REMEMBER_TOKEN_DAYS};
use axum::{
    Form,
    extract::{Extension, Query},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::{error, warn};

fn session_cookie(id: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .build()
}

fn remember_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((REMEMBER_TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(time::Duration::days(REMEMBER_TOKEN_DAYS))
        .build()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build(name).path("/").build()
}

fn page(status: StatusCode, rendered: AuthResult<Html<String>>) -> Response {
    match rendered {
        Ok(html) => (status, html).into_response(),
        Err(e) => {
            error!("Page rendering failed: {}", e);
            (e.status_code(), e.user_message()).into_response()
        }
    }
}

/// Render the login form, or leave it when the browser already holds a live session
#[axum::debug_handler]
pub async fn login_page(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<Arc<AppContext>>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> Response {
    match current_session(&pool, &ctx, &jar).await {
        Ok(Some(_)) => {
            let target = redirect_target(query.next.as_deref(), &ctx.config.landing_path);
            // Landing on the login page itself would loop.
            if !is_login_path(&target) {
                return Redirect::to(&target).into_response();
            }
        }
        Ok(None) => {}
        Err(e) => warn!("Session lookup failed on login page: {:#}", e),
    }

    page(
        StatusCode::OK,
        ctx.views.login_page(None, "", query.next.as_deref()),
    )
}

/// Handle login form submission
#[axum::debug_handler]
pub async fn login_submit(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<Arc<AppContext>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth = Authenticator::new(&pool, &ctx);

    let outcome = match auth
        .authenticate(&form.identifier, &form.password, form.remember_requested())
        .await
    {
        Ok(outcome) => outcome,
        Err(error) => {
            let rendered = ctx.views.login_page(
                Some(error.user_message()),
                form.identifier.trim(),
                form.next.as_deref(),
            );
            return page(error.status_code(), rendered);
        }
    };

    if let Some(previous) = jar.get(SESSION_COOKIE) {
        let sessions = SessionService::new(&pool, ctx.config.session_ttl_seconds);
        if let Err(e) = sessions.destroy(previous.value()).await {
            warn!("Failed to discard previous session: {:#}", e);
        }
    }

    let jar = jar.add(session_cookie(outcome.session_id, &ctx.config));
    let jar = match outcome.remember_token {
        Some(token) => jar.add(remember_cookie(token, &ctx.config)),
        None => jar.remove(removal_cookie(REMEMBER_TOKEN_COOKIE)),
    };

    let target = redirect_target(form.next.as_deref(), &ctx.config.landing_path);
    (jar, Redirect::to(&target)).into_response()
}

/// Destroy the session and return to the login entry point
#[axum::debug_handler]
pub async fn logout(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<Arc<AppContext>>,
    jar: CookieJar,
) -> Response {
    let session_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_string());

    if let Err(e) = Authenticator::new(&pool, &ctx)
        .logout(session_id.as_deref())
        .await
    {
        warn!("Logout could not remove the session record: {}", e);
    }

    let jar = jar
        .remove(removal_cookie(SESSION_COOKIE))
        .remove(removal_cookie(REMEMBER_TOKEN_COOKIE));

    (jar, Redirect::to(LOGIN_PATH)).into_response()
}

/// Default landing page
#[axum::debug_handler]
pub async fn dashboard(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<Arc<AppContext>>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    let CurrentSession { id, mut session } = current;

    let login_success = SessionService::new(&pool, ctx.config.session_ttl_seconds)
        .take_login_success(&id, &mut session)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to clear login flag: {:#}", e);
            false
        });

    page(
        StatusCode::OK,
        ctx.views.dashboard_page(&session, login_success),
    )
}
