// POST /api/auth/logout - revoke the current session
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::json;

use crate::auth::cookies;
use crate::error::ApiError;
use crate::middleware::Identity;
use crate::services::SessionService;

/// Deletes the session row matching the presented token (idempotent) and
/// expires the cookie. Revocation takes effect before the JWT's own expiry.
/// Ephemeral callers have no session row; their cookie is simply cleared.
pub async fn logout(
    Extension(identity): Extension<Identity>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let cleared = if identity.is_ephemeral() {
        cookies::clear_cookie(cookies::DEMO_COOKIE)
    } else {
        if let Some(token) = cookies::get_cookie(&headers, cookies::AUTH_COOKIE) {
            let sessions = SessionService::new().await?;
            sessions.revoke(&token).await?;
        }
        cookies::clear_cookie(cookies::AUTH_COOKIE)
    };

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cleared)],
        Json(json!({ "success": true, "data": { "logged_out": true } })),
    )
        .into_response())
}
