// POST /auth/signup - create an agency and its owner account
use axum::response::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use super::utils::validate_email_format;
use crate::auth::credentials;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::user_service::SignupData;
use crate::services::UserService;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub agency_name: String,
}

/// Creates the tenant (plan=free, status=active) and its owner principal
/// (role=owner, unverified) atomically. Email delivery is an external
/// collaborator; the verification token is surfaced in the response in its
/// place so the verify-email flow can complete.
pub async fn signup(Json(payload): Json<SignupRequest>) -> ApiResult<Value> {
    let mut field_errors = HashMap::new();

    if payload.first_name.trim().is_empty() {
        field_errors.insert("first_name".to_string(), "First name is required".to_string());
    }
    if payload.last_name.trim().is_empty() {
        field_errors.insert("last_name".to_string(), "Last name is required".to_string());
    }
    if payload.agency_name.trim().is_empty() {
        field_errors.insert("agency_name".to_string(), "Agency name is required".to_string());
    }
    if let Err(message) = validate_email_format(&payload.email) {
        field_errors.insert("email".to_string(), message.to_string());
    }
    if let Err(message) = credentials::validate_password(&payload.password) {
        field_errors.insert("password".to_string(), message.to_string());
    }
    if payload.password != payload.confirm_password {
        field_errors.insert(
            "confirm_password".to_string(),
            "Passwords do not match".to_string(),
        );
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error("Invalid signup input", Some(field_errors)));
    }

    let service = UserService::new().await?;
    let (agency, user, verification_token) = service
        .signup(SignupData {
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            password: payload.password,
            agency_name: payload.agency_name.trim().to_string(),
        })
        .await?;

    Ok(ApiResponse::created(json!({
        "agency": {
            "id": agency.id,
            "name": agency.name,
            "plan": agency.plan,
            "status": agency.status,
        },
        "user": {
            "id": user.id,
            "email": user.email,
            "role": user.role,
            "email_verified": user.email_verified,
        },
        "verification_token": verification_token,
    })))
}
