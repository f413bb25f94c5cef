use axum::{extract::Request, middleware::Next, response::Response};

use crate::database::models::Role;
use crate::error::ApiError;
use crate::middleware::auth::Identity;

/// Role guard. Must run after the authentication middleware has attached
/// an Identity; a missing identity is a 401, a role outside the permitted
/// set is a 403 naming the required set and the caller's actual role.
///
/// Compose at the router with a capturing closure:
/// `middleware::from_fn(|req, next| require_role(&[Role::Owner], req, next))`
pub async fn require_role(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let actual = identity.role();
    if !allowed.contains(&actual) {
        return Err(ApiError::RoleForbidden {
            required: allowed.iter().map(Role::as_str).collect(),
            actual: actual.to_string(),
        });
    }

    Ok(next.run(request).await)
}
