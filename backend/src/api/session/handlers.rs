//! Read-only JSON view of the signed-in session.

use crate::api::common::ApiResponse;
use crate::auth::models::{CurrentSession, Session};
use axum::{extract::Extension, response::Json};

/// Current session for page scripts (display name, role, avatar)
#[axum::debug_handler]
pub async fn current_session_info(
    Extension(current): Extension<CurrentSession>,
) -> Json<ApiResponse<Session>> {
    Json(ApiResponse::success(current.session, "Session active"))
}
