use crate::api::session::handlers::*;
use crate::auth::middleware::require_session;
use axum::{Router, middleware, routing::get};

pub fn session_router() -> Router {
    Router::new().route(
        "/",
        get(current_session_info).layer(middleware::from_fn(require_session)),
    )
}
