//! Defines the HTTP routes for the login flow.
//!
//! The login entry point and logout are public; the landing page sits behind the
//! session guard. These are designed to be merged into the main Axum router.

use crate::auth::handlers::*;
use crate::auth::middleware::*;
use axum::{Router, middleware, routing::get};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout).post(logout))
        .route(
            "/dashboard",
            get(dashboard).layer(middleware::from_fn(require_session)),
        )
}
