use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::credentials;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::TemporaryAccess;

const ACCESS_COLUMNS: &str =
    "id, agency_id, label, token, expires_at, is_active, created_by, created_at";

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Temporary access grant not found")]
    NotFound,
}

/// Lifecycle of temporary access grants: agency-issued, revocable,
/// optionally time-boxed share tokens.
pub struct AccessService {
    pool: PgPool,
}

impl AccessService {
    pub async fn new() -> Result<Self, AccessError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mint a grant with a long opaque token. The token is looked up
    /// directly against the store, not verified cryptographically.
    pub async fn create(
        &self,
        agency_id: Uuid,
        created_by: Uuid,
        label: &str,
        validity_days: Option<i64>,
    ) -> Result<TemporaryAccess, AccessError> {
        let token = credentials::generate_token(32);
        let expires_at = validity_days.map(|days| Utc::now() + Duration::days(days));

        let grant = sqlx::query_as::<_, TemporaryAccess>(&format!(
            r#"
            INSERT INTO temporary_access (agency_id, label, token, expires_at, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACCESS_COLUMNS}
            "#,
        ))
        .bind(agency_id)
        .bind(label)
        .bind(&token)
        .bind(expires_at)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(grant)
    }

    /// Tenant-scoped listing, newest first.
    pub async fn list(&self, agency_id: Uuid) -> Result<Vec<TemporaryAccess>, AccessError> {
        let grants = sqlx::query_as::<_, TemporaryAccess>(&format!(
            "SELECT {ACCESS_COLUMNS} FROM temporary_access WHERE agency_id = $1 ORDER BY created_at DESC"
        ))
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(grants)
    }

    /// Revoke by flipping is_active; the row stays as an audit trail.
    /// A grant in another agency reads as not found.
    pub async fn revoke(&self, agency_id: Uuid, grant_id: Uuid) -> Result<(), AccessError> {
        let result = sqlx::query(
            "UPDATE temporary_access SET is_active = FALSE WHERE id = $1 AND agency_id = $2",
        )
        .bind(grant_id)
        .bind(agency_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AccessError::NotFound);
        }
        Ok(())
    }

    /// Bare-token point lookup used by the public validation and exchange
    /// endpoints. Validity (active + unexpired) is the caller's check.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<TemporaryAccess>, AccessError> {
        let grant = sqlx::query_as::<_, TemporaryAccess>(&format!(
            "SELECT {ACCESS_COLUMNS} FROM temporary_access WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(grant)
    }

    /// Point lookup by id, used by the demo authentication path.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<TemporaryAccess>, AccessError> {
        let grant = sqlx::query_as::<_, TemporaryAccess>(&format!(
            "SELECT {ACCESS_COLUMNS} FROM temporary_access WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(grant)
    }
}
