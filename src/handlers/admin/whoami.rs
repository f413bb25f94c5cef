// GET /admin/whoami - re-verify the admin cookie on every call
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::{cookies, jwt};
use crate::error::ApiError;
use crate::services::AdminService;

/// Unlike the guarded admin routes this endpoint manages its own cookie:
/// the active flag is re-checked against the store on each call (never
/// cached from the token), and an account deactivated after token issuance
/// gets its cookie cleared and a 401.
pub async fn whoami(headers: HeaderMap) -> Result<Response, ApiError> {
    let token = cookies::get_cookie(&headers, cookies::ADMIN_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("Admin token missing"))?;

    let claims = jwt::verify_admin_token(&token)
        .ok_or_else(|| ApiError::unauthorized("Admin token invalid"))?;

    let service = AdminService::new().await?;
    let admin = service.find_by_id(claims.admin_id).await?;

    match admin.filter(|admin| admin.is_active) {
        Some(admin) => Ok(Json(json!({
            "success": true,
            "data": {
                "id": admin.id,
                "email": admin.email,
                "name": admin.name,
                "last_login": admin.last_login,
            }
        }))
        .into_response()),
        None => {
            // Fail closed and drop the now-useless cookie.
            let error = ApiError::unauthorized("Admin account inactive or not found");
            Ok((
                StatusCode::UNAUTHORIZED,
                [(header::SET_COOKIE, cookies::clear_cookie(cookies::ADMIN_COOKIE))],
                Json(error.to_json()),
            )
                .into_response())
        }
    }
}
