use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Agency-scoped share grant. The token is an opaque random value looked up
/// directly against this table, never a JWT. Revocation flips is_active and
/// keeps the row as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemporaryAccess {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub label: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TemporaryAccess {
    /// A grant is usable only while active and (if time-boxed) unexpired.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.map_or(true, |exp| exp > now)
    }
}
