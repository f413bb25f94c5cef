// Public endpoints for temporary access grants: the pre-flight validation
// a demo landing page runs, and the exchange that turns a bare grant token
// into a demo_token cookie.
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{cookies, jwt};
use crate::config;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::{AccessService, UserService};

#[derive(Debug, Deserialize)]
pub struct DemoTokenRequest {
    pub token: String,
}

/// POST /demo/validate - report whether a bare grant token is currently
/// usable, with the agency's display name and the grant label. Requires no
/// authentication; an unusable token reads as valid=false without detail.
pub async fn validate(Json(payload): Json<DemoTokenRequest>) -> ApiResult<Value> {
    let access = AccessService::new().await?;

    let grant = access
        .find_by_token(payload.token.trim())
        .await?
        .filter(|grant| grant.is_valid_at(Utc::now()));

    let Some(grant) = grant else {
        return Ok(ApiResponse::success(json!({ "valid": false })));
    };

    let users = UserService::new().await?;
    let agency = users
        .find_agency(grant.agency_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Agency not found"))?;

    Ok(ApiResponse::success(json!({
        "valid": true,
        "agency_name": agency.name,
        "label": grant.label,
    })))
}

/// POST /demo/exchange - mint a 24-hour demo JWT for a valid grant and set
/// it as the demo_token cookie. The only way a grant becomes a session.
pub async fn exchange(Json(payload): Json<DemoTokenRequest>) -> Result<Response, ApiError> {
    let access = AccessService::new().await?;

    let grant = access
        .find_by_token(payload.token.trim())
        .await?
        .filter(|grant| grant.is_valid_at(Utc::now()))
        .ok_or_else(|| ApiError::unauthorized("Temporary access token invalid or expired"))?;

    let token = jwt::sign_demo_token(grant.id, grant.agency_id, &grant.label)?;
    let max_age = config::config().security.demo_token_ttl_hours * 3_600;
    let cookie = cookies::build_cookie(cookies::DEMO_COOKIE, &token, max_age);

    tracing::info!("Issued demo token for grant '{}' ({})", grant.label, grant.id);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({
            "success": true,
            "data": {
                "label": grant.label,
                "expires_in": max_age,
            }
        })),
    )
        .into_response())
}
