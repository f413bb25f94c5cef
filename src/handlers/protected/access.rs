// Owner-only lifecycle of temporary access grants.
use axum::{extract::Path, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::Identity;
use crate::services::AccessService;

#[derive(Debug, Deserialize)]
pub struct CreateAccessRequest {
    pub label: String,
    /// Optional validity window; absent means the grant only dies by
    /// revocation.
    pub validity_days: Option<i64>,
}

/// POST /api/access - mint a share grant. The raw token appears only in
/// this response; listings omit it.
pub async fn create(
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateAccessRequest>,
) -> ApiResult<Value> {
    let created_by = identity
        .user_id()
        .ok_or_else(|| ApiError::forbidden("Demo sessions cannot manage access grants"))?;

    let label = payload.label.trim();
    if label.is_empty() {
        return Err(ApiError::bad_request("Label is required"));
    }
    if payload.validity_days.is_some_and(|days| days <= 0) {
        return Err(ApiError::bad_request("Validity must be a positive number of days"));
    }

    let service = AccessService::new().await?;
    let grant = service
        .create(identity.agency_id(), created_by, label, payload.validity_days)
        .await?;

    Ok(ApiResponse::created(json!({
        "id": grant.id,
        "label": grant.label,
        "token": grant.token,
        "expires_at": grant.expires_at,
    })))
}

/// GET /api/access - tenant-scoped grant listing (tokens omitted).
pub async fn list(Extension(identity): Extension<Identity>) -> ApiResult<Value> {
    let service = AccessService::new().await?;
    let grants = service.list(identity.agency_id()).await?;

    Ok(ApiResponse::success(json!({ "grants": grants })))
}

/// DELETE /api/access/:id - revoke a grant, preserving the row for audit.
pub async fn revoke(
    Extension(identity): Extension<Identity>,
    Path(grant_id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = AccessService::new().await?;
    service.revoke(identity.agency_id(), grant_id).await?;

    Ok(ApiResponse::success(json!({ "revoked": grant_id })))
}
