//! Client repository. All reads and writes are scoped to the owning coach
//! except `find_by_id`, which workflows use before their own ownership check.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::client::{Client, UpdateClientPayload};

const CLIENT_COLUMNS: &str = "id, coach_id, full_name, counselor, vendor, hourly_wage, ipe_goal, \
                              emergency_contact_name, emergency_contact_phone, created_at, updated_at";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepositoryTrait: Send + Sync {
    /// Find a client by ID without ownership scoping.
    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<Option<Client>, AppError>;
}

/// Concrete implementation of ClientRepositoryTrait plus the owner-scoped
/// CRUD used directly by handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClientRepositoryTrait for ClientRepository {
    async fn find_by_id(&self, db: &PgPool, id: &str) -> Result<Option<Client>, AppError> {
        let query = format!("SELECT {} FROM clients WHERE id = $1", CLIENT_COLUMNS);
        let client = sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(db)
            .await?;
        Ok(client)
    }
}

pub async fn insert(pool: &PgPool, client: &Client) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO clients \
         (id, coach_id, full_name, counselor, vendor, hourly_wage, ipe_goal, \
          emergency_contact_name, emergency_contact_phone, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(&client.id)
    .bind(&client.coach_id)
    .bind(&client.full_name)
    .bind(&client.counselor)
    .bind(&client.vendor)
    .bind(client.hourly_wage)
    .bind(&client.ipe_goal)
    .bind(&client.emergency_contact_name)
    .bind(&client.emergency_contact_phone)
    .bind(client.created_at)
    .bind(client.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn list_for_coach(pool: &PgPool, coach_id: &str) -> Result<Vec<Client>, AppError> {
    let query = format!(
        "SELECT {} FROM clients WHERE coach_id = $1 ORDER BY full_name",
        CLIENT_COLUMNS
    );
    let clients = sqlx::query_as::<_, Client>(&query)
        .bind(coach_id)
        .fetch_all(pool)
        .await?;
    Ok(clients)
}

pub async fn find_for_coach(
    pool: &PgPool,
    id: &str,
    coach_id: &str,
) -> Result<Option<Client>, AppError> {
    let query = format!(
        "SELECT {} FROM clients WHERE id = $1 AND coach_id = $2",
        CLIENT_COLUMNS
    );
    let client = sqlx::query_as::<_, Client>(&query)
        .bind(id)
        .bind(coach_id)
        .fetch_optional(pool)
        .await?;
    Ok(client)
}

pub async fn update(
    pool: &PgPool,
    client: &Client,
    changes: &UpdateClientPayload,
) -> Result<Client, AppError> {
    let query = format!(
        "UPDATE clients SET full_name = $1, counselor = $2, vendor = $3, hourly_wage = $4, \
         ipe_goal = $5, emergency_contact_name = $6, emergency_contact_phone = $7, updated_at = $8 \
         WHERE id = $9 RETURNING {}",
        CLIENT_COLUMNS
    );
    let updated = sqlx::query_as::<_, Client>(&query)
        .bind(changes.full_name.as_ref().unwrap_or(&client.full_name))
        .bind(changes.counselor.as_ref().or(client.counselor.as_ref()))
        .bind(changes.vendor.as_ref().or(client.vendor.as_ref()))
        .bind(changes.hourly_wage.or(client.hourly_wage))
        .bind(changes.ipe_goal.as_ref().or(client.ipe_goal.as_ref()))
        .bind(
            changes
                .emergency_contact_name
                .as_ref()
                .or(client.emergency_contact_name.as_ref()),
        )
        .bind(
            changes
                .emergency_contact_phone
                .as_ref()
                .or(client.emergency_contact_phone.as_ref()),
        )
        .bind(Utc::now())
        .bind(&client.id)
        .fetch_one(pool)
        .await?;
    Ok(updated)
}

pub async fn delete(pool: &PgPool, id: &str, coach_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND coach_id = $2")
        .bind(id)
        .bind(coach_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
