// POST /admin/logout - clear the admin cookie
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::cookies;

/// Admin tokens are not session-backed; logout just expires the cookie.
pub async fn logout() -> Response {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookies::clear_cookie(cookies::ADMIN_COOKIE))],
        Json(json!({ "success": true, "data": { "logged_out": true } })),
    )
        .into_response()
}
