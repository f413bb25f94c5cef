use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::credentials;
use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Session;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
}

/// Persisted record of issued tokens, enabling logout/revocation
/// independent of JWT self-expiry.
pub struct SessionService {
    pool: PgPool,
}

impl SessionService {
    pub async fn new() -> Result<Self, SessionError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a freshly issued token. Stores only the token digest plus
    /// client metadata; expiry mirrors the JWT's own 7-day lifetime.
    pub async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<Session, SessionError> {
        let expires_at = Utc::now() + Duration::days(config::config().security.session_ttl_days);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (user_id, token_hash, expires_at, ip, user_agent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token_hash, expires_at, ip, user_agent, created_at
            "#,
        )
        .bind(user_id)
        .bind(credentials::hash_token(token))
        .bind(expires_at)
        .bind(ip)
        .bind(user_agent)
        .fetch_one(&self.pool)
        .await?;

        Ok(session)
    }

    /// A session is usable only if a row exists with a matching digest AND
    /// an expiry strictly in the future.
    pub async fn find_valid(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token_hash, expires_at, ip, user_agent, created_at
            FROM sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(credentials::hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Delete the session matching the presented token. Idempotent.
    pub async fn revoke(&self, token: &str) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(credentials::hash_token(token))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove expired rows to bound storage growth. An administrative
    /// operation, never part of the request path: expired rows are already
    /// unmatched by find_valid.
    pub async fn sweep_expired(&self) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
