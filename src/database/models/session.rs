use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Server-side revocation record for an issued auth token.
///
/// Only the sha-256 digest of the bearer JWT is stored, so a compromised
/// sessions table never yields a usable token. A row is valid while
/// expires_at is in the future; deleting it revokes the token before its
/// JWT expiry.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}
