// GET /api/auth/whoami - current caller identity
use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::Identity;
use crate::services::UserService;

/// Returns the resolved identity. Registered callers get a fresh user row
/// rather than a claims echo; ephemeral callers get their grant context.
pub async fn whoami(Extension(identity): Extension<Identity>) -> ApiResult<Value> {
    match identity {
        Identity::Registered { id, .. } => {
            let service = UserService::new().await?;
            let user = service
                .find_by_id(id)
                .await?
                .ok_or_else(|| ApiError::unauthorized("Account inactive or not found"))?;

            Ok(ApiResponse::success(json!({
                "id": user.id,
                "email": user.email,
                "first_name": user.first_name,
                "last_name": user.last_name,
                "role": user.role,
                "agency_id": user.agency_id,
                "email_verified": user.email_verified,
                "last_login": user.last_login,
                "is_ephemeral": false,
            })))
        }
        Identity::Ephemeral {
            access_id,
            label,
            agency_id,
        } => Ok(ApiResponse::success(json!({
            "id": access_id,
            "label": label,
            "agency_id": agency_id,
            "role": "member",
            "is_ephemeral": true,
        }))),
    }
}
