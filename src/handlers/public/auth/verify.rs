// POST /auth/verify-email - confirm an address with its one-time token
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct VerifyEmailRequest {
    pub token: String,
}

pub async fn verify_email(Json(payload): Json<VerifyEmailRequest>) -> ApiResult<Value> {
    if payload.token.trim().is_empty() {
        return Err(ApiError::bad_request("Verification token is required"));
    }

    let service = UserService::new().await?;
    let user = service.verify_email(payload.token.trim()).await?;

    Ok(ApiResponse::success(json!({
        "email": user.email,
        "email_verified": user.email_verified,
    })))
}
