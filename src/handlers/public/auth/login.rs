// POST /auth/login - authenticate and receive the auth_token cookie
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::json;

use super::utils::{client_ip, user_agent};
use crate::auth::{cookies, credentials, jwt};
use crate::config;
use crate::error::ApiError;
use crate::services::{SessionService, UserService};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Validates credentials, records a session row keyed by the token digest,
/// and sets the auth_token cookie. The 401 body is identical for unknown
/// email and wrong password.
pub async fn login(headers: HeaderMap, Json(payload): Json<LoginRequest>) -> Result<Response, ApiError> {
    let users = UserService::new().await?;

    let user = users
        .find_by_email(&payload.email)
        .await?
        .filter(|user| credentials::verify_password(&payload.password, &user.password_hash))
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if !user.is_active {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }
    if !user.email_verified {
        return Err(ApiError::EmailNotVerified);
    }

    let token = jwt::sign_user_token(user.id, user.agency_id, user.role())?;

    let sessions = SessionService::new().await?;
    sessions
        .create(user.id, &token, client_ip(&headers), user_agent(&headers))
        .await?;

    // Independent statement: a crash here leaves the login valid, at worst
    // missing the last_login stamp.
    users.mark_login(user.id).await?;

    let max_age = config::config().security.session_ttl_days * 86_400;
    let cookie = cookies::build_cookie(cookies::AUTH_COOKIE, &token, max_age);

    tracing::info!("User {} logged in", user.email);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "data": {
                "user": {
                    "id": user.id,
                    "email": user.email,
                    "first_name": user.first_name,
                    "last_name": user.last_name,
                    "role": user.role,
                    "agency_id": user.agency_id,
                }
            }
        })),
    )
        .into_response())
}
