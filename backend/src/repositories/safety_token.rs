//! Safety-token repository.
//!
//! At most one non-revoked token exists per client; `revoke` is a conditional
//! update so repeated revocation stays idempotent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::safety_token::SafetyToken;

const TOKEN_COLUMNS: &str = "id, client_id, token, created_by, created_at, revoked_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SafetyTokenRepositoryTrait: Send + Sync {
    /// Find the live token for a client, if any.
    async fn find_active_by_client(
        &self,
        db: &PgPool,
        client_id: &str,
    ) -> Result<Option<SafetyToken>, AppError>;

    /// Resolve a presented token to its live record.
    async fn find_active_by_token(
        &self,
        db: &PgPool,
        token: &str,
    ) -> Result<Option<SafetyToken>, AppError>;

    /// Insert a freshly issued token.
    async fn insert(&self, db: &PgPool, record: &SafetyToken) -> Result<(), AppError>;

    /// Set `revoked_at` iff it is still NULL. Returns `true` when this call
    /// made the transition.
    async fn revoke(&self, db: &PgPool, id: &str, now: DateTime<Utc>) -> Result<bool, AppError>;
}

/// Concrete implementation of SafetyTokenRepositoryTrait.
#[derive(Debug, Default, Clone, Copy)]
pub struct SafetyTokenRepository;

impl SafetyTokenRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SafetyTokenRepositoryTrait for SafetyTokenRepository {
    async fn find_active_by_client(
        &self,
        db: &PgPool,
        client_id: &str,
    ) -> Result<Option<SafetyToken>, AppError> {
        let query = format!(
            "SELECT {} FROM client_safety_tokens \
             WHERE client_id = $1 AND revoked_at IS NULL",
            TOKEN_COLUMNS
        );
        let record = sqlx::query_as::<_, SafetyToken>(&query)
            .bind(client_id)
            .fetch_optional(db)
            .await?;
        Ok(record)
    }

    async fn find_active_by_token(
        &self,
        db: &PgPool,
        token: &str,
    ) -> Result<Option<SafetyToken>, AppError> {
        let query = format!(
            "SELECT {} FROM client_safety_tokens \
             WHERE token = $1 AND revoked_at IS NULL",
            TOKEN_COLUMNS
        );
        let record = sqlx::query_as::<_, SafetyToken>(&query)
            .bind(token)
            .fetch_optional(db)
            .await?;
        Ok(record)
    }

    async fn insert(&self, db: &PgPool, record: &SafetyToken) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO client_safety_tokens \
             (id, client_id, token, created_by, created_at, revoked_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.id)
        .bind(&record.client_id)
        .bind(&record.token)
        .bind(&record.created_by)
        .bind(record.created_at)
        .bind(record.revoked_at)
        .execute(db)
        .await?;
        Ok(())
    }

    async fn revoke(&self, db: &PgPool, id: &str, now: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE client_safety_tokens SET revoked_at = $1 \
             WHERE id = $2 AND revoked_at IS NULL",
        )
        .bind(now)
        .bind(id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
