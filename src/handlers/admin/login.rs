// POST /admin/login - operator authentication, entirely disjoint from the
// tenant plane.
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{cookies, credentials, jwt};
use crate::config;
use crate::error::ApiError;
use crate::services::AdminService;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// Case-insensitive email lookup, bcrypt check, inactive rejection, and a
/// 7-day admin token under its own cookie and secret. The 401 body never
/// distinguishes unknown email from wrong password.
pub async fn login(Json(payload): Json<AdminLoginRequest>) -> Result<Response, ApiError> {
    let service = AdminService::new().await?;

    let admin = service
        .find_by_email(&payload.email)
        .await?
        .filter(|admin| credentials::verify_password(&payload.password, &admin.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !admin.is_active {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    service.mark_login(admin.id).await?;

    let token = jwt::sign_admin_token(admin.id, &admin.email)?;
    let max_age = config::config().security.session_ttl_days * 86_400;
    let cookie = cookies::build_cookie(cookies::ADMIN_COOKIE, &token, max_age);

    tracing::info!("Admin {} logged in", admin.email);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "data": {
                "admin": {
                    "id": admin.id,
                    "email": admin.email,
                    "name": admin.name,
                }
            }
        })),
    )
        .into_response())
}
