//! Invitation repository.
//!
//! Tokens are stored as SHA-256 hashes. `mark_used` is a conditional update:
//! it only transitions a row whose `used_at` is still NULL and reports whether
//! this call performed the transition, which is the race guard behind the
//! consume-at-most-once contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::invitation::Invitation;

const INVITATION_COLUMNS: &str =
    "id, email, token_hash, invited_by, expires_at, created_at, used_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationRepositoryTrait: Send + Sync {
    /// Find a pending, unexpired invitation for the email.
    async fn find_live_by_email(
        &self,
        db: &PgPool,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, AppError>;

    /// Lazily delete expired, unused invitations for the email.
    async fn delete_expired_for_email(
        &self,
        db: &PgPool,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError>;

    /// Insert a new invitation row.
    async fn insert(&self, db: &PgPool, invitation: &Invitation) -> Result<(), AppError>;

    /// Find an invitation by token hash, regardless of lifecycle state.
    async fn find_by_token_hash(
        &self,
        db: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Invitation>, AppError>;

    /// Set `used_at` iff it is still NULL. Returns `true` when this call made
    /// the transition, `false` when another consumer already had.
    async fn mark_used(
        &self,
        db: &PgPool,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// All invitations, newest first.
    async fn list_all(&self, db: &PgPool) -> Result<Vec<Invitation>, AppError>;

    /// Delete an invitation row. Returns `true` when a row was removed.
    async fn delete(&self, db: &PgPool, id: &str) -> Result<bool, AppError>;
}

/// Concrete implementation of InvitationRepositoryTrait.
#[derive(Debug, Default, Clone, Copy)]
pub struct InvitationRepository;

impl InvitationRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl InvitationRepositoryTrait for InvitationRepository {
    async fn find_live_by_email(
        &self,
        db: &PgPool,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Invitation>, AppError> {
        let query = format!(
            "SELECT {} FROM invitations \
             WHERE email = $1 AND used_at IS NULL AND expires_at > $2",
            INVITATION_COLUMNS
        );
        let record = sqlx::query_as::<_, Invitation>(&query)
            .bind(email.to_lowercase())
            .bind(now)
            .fetch_optional(db)
            .await?;
        Ok(record)
    }

    async fn delete_expired_for_email(
        &self,
        db: &PgPool,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            "DELETE FROM invitations \
             WHERE email = $1 AND used_at IS NULL AND expires_at <= $2",
        )
        .bind(email.to_lowercase())
        .bind(now)
        .execute(db)
        .await?;
        Ok(result.rows_affected())
    }

    async fn insert(&self, db: &PgPool, invitation: &Invitation) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO invitations \
             (id, email, token_hash, invited_by, expires_at, created_at, used_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&invitation.id)
        .bind(&invitation.email)
        .bind(&invitation.token_hash)
        .bind(&invitation.invited_by)
        .bind(invitation.expires_at)
        .bind(invitation.created_at)
        .bind(invitation.used_at)
        .execute(db)
        .await?;
        Ok(())
    }

    async fn find_by_token_hash(
        &self,
        db: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Invitation>, AppError> {
        let query = format!(
            "SELECT {} FROM invitations WHERE token_hash = $1",
            INVITATION_COLUMNS
        );
        let record = sqlx::query_as::<_, Invitation>(&query)
            .bind(token_hash)
            .fetch_optional(db)
            .await?;
        Ok(record)
    }

    async fn mark_used(
        &self,
        db: &PgPool,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE invitations SET used_at = $1 WHERE id = $2 AND used_at IS NULL",
        )
        .bind(now)
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_all(&self, db: &PgPool) -> Result<Vec<Invitation>, AppError> {
        let query = format!(
            "SELECT {} FROM invitations ORDER BY created_at DESC",
            INVITATION_COLUMNS
        );
        let rows = sqlx::query_as::<_, Invitation>(&query).fetch_all(db).await?;
        Ok(rows)
    }

    async fn delete(&self, db: &PgPool, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
