use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::credentials::{self, CredentialError};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Agency, Invitation, Role, User};

const USER_COLUMNS: &str = "id, agency_id, first_name, last_name, email, password_hash, role, \
     email_verified, verification_token, reset_token, is_active, last_login, created_at, updated_at";

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,
    #[error("User not found")]
    NotFound,
}

/// Translate a unique violation on users.email into EmailTaken. The
/// find_by_email pre-check races against concurrent inserts; the loser of
/// that race must surface the same error as the pre-check, not a 500.
fn map_email_collision(err: sqlx::Error) -> UserError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => UserError::EmailTaken,
        other => UserError::Database(other),
    }
}

#[derive(Debug)]
pub struct SignupData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub agency_name: String,
}

#[derive(Debug)]
pub struct TeammateData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    /// When absent the service generates a policy-satisfying password and
    /// returns it once.
    pub password: Option<String>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, UserError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the agency and its owner account in one transaction, so a
    /// crash can never leave an orphaned agency without an owner.
    pub async fn signup(&self, data: SignupData) -> Result<(Agency, User, String), UserError> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let password_hash = credentials::hash_password(&data.password)?;
        let verification_token = credentials::generate_token(32);

        let mut tx = self.pool.begin().await?;

        let agency = sqlx::query_as::<_, Agency>(
            r#"
            INSERT INTO agencies (name, plan, status)
            VALUES ($1, 'free', 'active')
            RETURNING id, name, plan, status, is_demo, billing_customer_id, created_at, updated_at
            "#,
        )
        .bind(&data.agency_name)
        .fetch_one(&mut *tx)
        .await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (agency_id, first_name, last_name, email, password_hash, role, verification_token)
            VALUES ($1, $2, $3, LOWER($4), $5, 'owner', $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(agency.id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&password_hash)
        .bind(&verification_token)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_email_collision)?;

        tx.commit().await?;

        tracing::info!("Created agency '{}' with owner {}", agency.name, user.email);
        Ok((agency, user, verification_token))
    }

    /// Case-insensitive global lookup; email is unique across agencies.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Stamp last_login. Intentionally outside any transaction with the
    /// credential check and session insert; a crash in between leaves the
    /// system valid, at worst missing one timestamp update.
    pub async fn mark_login(&self, user_id: Uuid) -> Result<(), UserError> {
        sqlx::query("UPDATE users SET last_login = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Flip email_verified on a matching token and burn the token.
    pub async fn verify_email(&self, token: &str) -> Result<User, UserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email_verified = TRUE, verification_token = NULL, updated_at = NOW()
            WHERE verification_token = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(UserError::InvalidVerificationToken)
    }

    /// Provision a teammate account on behalf of an owner and record the
    /// already-accepted invitation. Returns the generated password exactly
    /// once when the owner did not supply one.
    pub async fn create_teammate(
        &self,
        agency_id: Uuid,
        invited_by: Uuid,
        data: TeammateData,
    ) -> Result<(User, Option<String>), UserError> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(UserError::EmailTaken);
        }

        let (password, generated) = match data.password {
            Some(password) => (password, None),
            None => {
                let password = credentials::generate_secure_password();
                (password.clone(), Some(password))
            }
        };
        let password_hash = credentials::hash_password(&password)?;

        let mut tx = self.pool.begin().await?;

        // Provisioned accounts skip the self-serve verification step; the
        // owner vouches for the address.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (agency_id, first_name, last_name, email, password_hash, role, email_verified)
            VALUES ($1, $2, $3, LOWER($4), $5, $6, TRUE)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(agency_id)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&password_hash)
        .bind(data.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_email_collision)?;

        sqlx::query(
            r#"
            INSERT INTO invitations (agency_id, email, role, invited_by, status, expires_at)
            VALUES ($1, LOWER($2), $3, $4, 'accepted', $5)
            "#,
        )
        .bind(agency_id)
        .bind(&data.email)
        .bind(data.role.as_str())
        .bind(invited_by)
        .bind(Utc::now() + Duration::days(7))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((user, generated))
    }

    /// Tenant-scoped team listing.
    pub async fn list_team(&self, agency_id: Uuid) -> Result<Vec<User>, UserError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE agency_id = $1 ORDER BY created_at"
        ))
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Remove a teammate. Owners are deactivated rather than deleted; a
    /// user outside the caller's agency reads as not found.
    pub async fn remove_teammate(&self, agency_id: Uuid, user_id: Uuid) -> Result<(), UserError> {
        let target = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND agency_id = $2"
        ))
        .bind(user_id)
        .bind(agency_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(UserError::NotFound)?;

        if target.role() == Role::Owner {
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(target.id)
                .execute(&self.pool)
                .await?;
        } else {
            sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(target.id)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Tenant-scoped invitation history.
    pub async fn list_invitations(&self, agency_id: Uuid) -> Result<Vec<Invitation>, UserError> {
        let invitations = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, agency_id, email, role, invited_by, status, expires_at, created_at
            FROM invitations
            WHERE agency_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(invitations)
    }

    pub async fn find_agency(&self, agency_id: Uuid) -> Result<Option<Agency>, UserError> {
        let agency = sqlx::query_as::<_, Agency>(
            r#"
            SELECT id, name, plan, status, is_demo, billing_customer_id, created_at, updated_at
            FROM agencies
            WHERE id = $1
            "#,
        )
        .bind(agency_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(agency)
    }
}
