// Owner-only team management: list, provision, remove teammates.
use axum::{extract::Path, response::Json, Extension};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

use crate::auth::credentials;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::handlers::public::auth::utils::validate_email_format;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::middleware::Identity;
use crate::services::user_service::TeammateData;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct CreateTeammateRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    /// Optional; when absent the server generates a policy-satisfying
    /// password and returns it exactly once.
    pub password: Option<String>,
}

/// GET /api/team - tenant-scoped team listing.
pub async fn list(Extension(identity): Extension<Identity>) -> ApiResult<Value> {
    let service = UserService::new().await?;
    let team = service.list_team(identity.agency_id()).await?;

    let members: Vec<Value> = team
        .iter()
        .map(|user| {
            json!({
                "id": user.id,
                "first_name": user.first_name,
                "last_name": user.last_name,
                "email": user.email,
                "role": user.role,
                "is_active": user.is_active,
                "last_login": user.last_login,
            })
        })
        .collect();

    Ok(ApiResponse::success(json!({ "members": members })))
}

/// POST /api/team - provision a teammate account and record the accepted
/// invitation.
pub async fn create(
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateTeammateRequest>,
) -> ApiResult<Value> {
    let invited_by = identity
        .user_id()
        .ok_or_else(|| ApiError::forbidden("Demo sessions cannot manage the team"))?;

    let mut field_errors = HashMap::new();

    if payload.first_name.trim().is_empty() {
        field_errors.insert("first_name".to_string(), "First name is required".to_string());
    }
    if payload.last_name.trim().is_empty() {
        field_errors.insert("last_name".to_string(), "Last name is required".to_string());
    }
    if let Err(message) = validate_email_format(&payload.email) {
        field_errors.insert("email".to_string(), message.to_string());
    }
    // Additional owners are not provisioned here; ownership transfer is a
    // support operation.
    let role = match Role::from_str(&payload.role) {
        Ok(Role::Owner) => {
            field_errors.insert(
                "role".to_string(),
                "Teammates can only be provisioned as member or model".to_string(),
            );
            None
        }
        Ok(role) => Some(role),
        Err(message) => {
            field_errors.insert("role".to_string(), message);
            None
        }
    };
    if let Some(password) = &payload.password {
        if let Err(message) = credentials::validate_password(password) {
            field_errors.insert("password".to_string(), message.to_string());
        }
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid teammate input", Some(field_errors)));
    }

    let service = UserService::new().await?;
    let (user, generated_password) = service
        .create_teammate(
            identity.agency_id(),
            invited_by,
            TeammateData {
                first_name: payload.first_name.trim().to_string(),
                last_name: payload.last_name.trim().to_string(),
                email: payload.email.trim().to_lowercase(),
                role: role.expect("validated above"),
                password: payload.password,
            },
        )
        .await?;

    Ok(ApiResponse::created(json!({
        "user": {
            "id": user.id,
            "email": user.email,
            "role": user.role,
        },
        // Shown exactly once; only the bcrypt hash is stored.
        "generated_password": generated_password,
    })))
}

/// DELETE /api/team/:id - remove a teammate. Owners are deactivated rather
/// than deleted; ids outside the caller's agency read as 404.
pub async fn remove(
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Value> {
    let service = UserService::new().await?;
    service.remove_teammate(identity.agency_id(), user_id).await?;

    Ok(ApiResponse::success(json!({ "removed": user_id })))
}

/// GET /api/team/invitations - tenant-scoped invitation history.
pub async fn invitations(Extension(identity): Extension<Identity>) -> ApiResult<Value> {
    let service = UserService::new().await?;
    let invitations = service.list_invitations(identity.agency_id()).await?;

    Ok(ApiResponse::success(json!({ "invitations": invitations })))
}
