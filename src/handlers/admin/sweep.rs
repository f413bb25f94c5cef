// POST /admin/sessions/sweep - purge expired session rows
use serde_json::{json, Value};

use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::SessionService;

/// Bounds storage growth by deleting rows that find_valid would never match
/// anyway. Administrative operation, guarded by require_admin.
pub async fn sweep_sessions() -> ApiResult<Value> {
    let service = SessionService::new().await?;
    let removed = service.sweep_expired().await?;

    tracing::info!("Swept {} expired sessions", removed);
    Ok(ApiResponse::success(json!({ "removed": removed })))
}
