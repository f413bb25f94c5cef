use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tenant row. Agencies are the unit of data partitioning and are never
/// hard-deleted; billing events and admin edits only mutate plan/status.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agency {
    pub id: Uuid,
    pub name: String,
    /// 'free' | 'premium'
    pub plan: String,
    /// 'active' | 'canceled' | 'expired' | 'suspended'
    pub status: String,
    pub is_demo: bool,
    pub billing_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
