use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::database::models::Role;

pub const TOKEN_TYPE_ADMIN: &str = "admin";
pub const TOKEN_TYPE_DEMO: &str = "demo";

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

/// Claims for the tenant plane (auth_token cookie).
#[derive(Debug, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: Uuid,
    pub agency_id: Uuid,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims for the admin plane (admin_token cookie). The token_type
/// discriminator is the load-bearing isolation between planes and is
/// checked on every verification.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub admin_id: Uuid,
    pub email: String,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims for the ephemeral demo plane (demo_token cookie), minted from a
/// temporary access grant. Self-contained: not backed by a session row.
#[derive(Debug, Serialize, Deserialize)]
pub struct DemoClaims {
    pub token_type: String,
    pub access_id: Uuid,
    pub agency_id: Uuid,
    pub label: String,
    pub iat: i64,
    pub exp: i64,
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

fn verify<T: for<'de> Deserialize<'de>>(token: &str, secret: &str) -> Option<T> {
    if secret.is_empty() {
        return None;
    }
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Issue a 7-day tenant-plane token.
pub fn sign_user_token(user_id: Uuid, agency_id: Uuid, role: Role) -> Result<String, JwtError> {
    let security = &config::config().security;
    let now = Utc::now();
    let claims = UserClaims {
        user_id,
        agency_id,
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(security.session_ttl_days)).timestamp(),
    };
    sign(&claims, &security.jwt_secret)
}

/// Verify signature and expiry; any failure yields None, never a panic.
pub fn verify_user_token(token: &str) -> Option<UserClaims> {
    verify(token, &config::config().security.jwt_secret)
}

/// Issue a 7-day admin-plane token, signed with the admin secret.
pub fn sign_admin_token(admin_id: Uuid, email: &str) -> Result<String, JwtError> {
    let security = &config::config().security;
    let now = Utc::now();
    let claims = AdminClaims {
        admin_id,
        email: email.to_string(),
        token_type: TOKEN_TYPE_ADMIN.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(security.session_ttl_days)).timestamp(),
    };
    sign(&claims, &security.admin_jwt_secret)
}

/// Verify an admin token, including its type discriminator.
pub fn verify_admin_token(token: &str) -> Option<AdminClaims> {
    verify::<AdminClaims>(token, &config::config().security.admin_jwt_secret)
        .filter(|claims| claims.token_type == TOKEN_TYPE_ADMIN)
}

/// Issue a 24-hour demo token for a temporary access grant.
pub fn sign_demo_token(access_id: Uuid, agency_id: Uuid, label: &str) -> Result<String, JwtError> {
    let security = &config::config().security;
    let now = Utc::now();
    let claims = DemoClaims {
        token_type: TOKEN_TYPE_DEMO.to_string(),
        access_id,
        agency_id,
        label: label.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(security.demo_token_ttl_hours)).timestamp(),
    };
    sign(&claims, &security.jwt_secret)
}

/// Verify a demo token, including its type discriminator.
pub fn verify_demo_token(token: &str) -> Option<DemoClaims> {
    verify::<DemoClaims>(token, &config::config().security.jwt_secret)
        .filter(|claims| claims.token_type == TOKEN_TYPE_DEMO)
}
