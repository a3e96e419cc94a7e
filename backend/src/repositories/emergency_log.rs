//! Append-only log of SOS trigger attempts.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::emergency_log::EmergencyLog;

const LOG_COLUMNS: &str =
    "id, client_id, coach_id, lat, lng, dispatched, recipient_count, detail, created_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmergencyLogRepositoryTrait: Send + Sync {
    async fn insert(&self, db: &PgPool, log: &EmergencyLog) -> Result<(), AppError>;
}

/// Concrete implementation of EmergencyLogRepositoryTrait.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmergencyLogRepository;

impl EmergencyLogRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmergencyLogRepositoryTrait for EmergencyLogRepository {
    async fn insert(&self, db: &PgPool, log: &EmergencyLog) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO emergency_logs \
             (id, client_id, coach_id, lat, lng, dispatched, recipient_count, detail, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&log.id)
        .bind(&log.client_id)
        .bind(&log.coach_id)
        .bind(log.lat)
        .bind(log.lng)
        .bind(log.dispatched)
        .bind(log.recipient_count)
        .bind(&log.detail)
        .bind(log.created_at)
        .execute(db)
        .await?;
        Ok(())
    }
}

/// Recent alerts for a client, newest first.
pub async fn list_for_client(
    pool: &PgPool,
    client_id: &str,
    limit: i64,
) -> Result<Vec<EmergencyLog>, AppError> {
    let query = format!(
        "SELECT {} FROM emergency_logs WHERE client_id = $1 \
         ORDER BY created_at DESC LIMIT $2",
        LOG_COLUMNS
    );
    let rows = sqlx::query_as::<_, EmergencyLog>(&query)
        .bind(client_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
