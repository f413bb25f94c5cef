use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::credentials::{self, CredentialError};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::Admin;

const ADMIN_COLUMNS: &str = "id, email, password_hash, name, is_active, last_login, created_at";

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("An admin with this email already exists")]
    EmailTaken,
}

/// Operator accounts live in their own table with no tenant scoping.
pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub async fn new() -> Result<Self, AdminError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AdminError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>, AdminError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    pub async fn mark_login(&self, admin_id: Uuid) -> Result<(), AdminError> {
        sqlx::query("UPDATE admins SET last_login = NOW() WHERE id = $1")
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Provision an operator account. Used by the CLI bootstrap command,
    /// not exposed over HTTP.
    pub async fn create(&self, email: &str, name: &str, password: &str) -> Result<Admin, AdminError> {
        if self.find_by_email(email).await?.is_some() {
            return Err(AdminError::EmailTaken);
        }

        let password_hash = credentials::hash_password(password)?;
        let admin = sqlx::query_as::<_, Admin>(&format!(
            r#"
            INSERT INTO admins (email, password_hash, name)
            VALUES (LOWER($1), $2, $3)
            RETURNING {ADMIN_COLUMNS}
            "#,
        ))
        .bind(email)
        .bind(&password_hash)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        // The pre-check races against concurrent creates; the loser must
        // still read as EmailTaken.
        .map_err(|err| match err {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AdminError::EmailTaken,
            other => AdminError::Database(other),
        })?;

        tracing::info!("Created admin account {}", admin.email);
        Ok(admin)
    }
}
