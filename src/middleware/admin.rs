use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::{cookies, jwt};
use crate::database::models::Admin;
use crate::error::ApiError;
use crate::services::AdminService;

/// Full admin row loaded into the request by the admin guard.
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub Admin);

/// Admin-plane route guard. Structurally mirrors the tenant authentication
/// gate but is deliberately segregated: its own cookie, its own signing
/// secret, and the `admin` token-type discriminator checked on every
/// verification. A valid tenant auth_token never passes here.
///
/// The account's active flag is re-checked on every call rather than
/// trusted from the token, so deactivation takes effect mid-session.
pub async fn require_admin(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = cookies::get_cookie(request.headers(), cookies::ADMIN_COOKIE)
        .ok_or_else(|| ApiError::unauthorized("Admin token missing"))?;

    let claims = jwt::verify_admin_token(&token)
        .ok_or_else(|| ApiError::unauthorized("Admin token invalid"))?;

    let service = AdminService::new().await?;
    let admin = service
        .find_by_id(claims.admin_id)
        .await?
        .filter(|admin| admin.is_active)
        .ok_or_else(|| ApiError::unauthorized("Admin account inactive or not found"))?;

    request.extensions_mut().insert(CurrentAdmin(admin));
    Ok(next.run(request).await)
}
