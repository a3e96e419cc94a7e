//! Field-note entry repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::entry::Entry;

const ENTRY_COLUMNS: &str = "id, worker_id, client_name, mood, transcript, formatted_note, \
                             consumer_hours, lat, lng, created_at";

pub async fn insert(pool: &PgPool, entry: &Entry) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO entries \
         (id, worker_id, client_name, mood, transcript, formatted_note, \
          consumer_hours, lat, lng, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&entry.id)
    .bind(&entry.worker_id)
    .bind(&entry.client_name)
    .bind(entry.mood.clone())
    .bind(&entry.transcript)
    .bind(&entry.formatted_note)
    .bind(entry.consumer_hours)
    .bind(entry.lat)
    .bind(entry.lng)
    .bind(entry.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Entries for the worker matching the client name inside the window,
/// oldest first. Billing aggregation relies on this ordering.
pub async fn find_for_client_in_range(
    pool: &PgPool,
    worker_id: &str,
    client_name: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Entry>, AppError> {
    let query = format!(
        "SELECT {} FROM entries \
         WHERE worker_id = $1 AND client_name = $2 \
           AND created_at >= $3 AND created_at <= $4 \
         ORDER BY created_at",
        ENTRY_COLUMNS
    );
    let entries = sqlx::query_as::<_, Entry>(&query)
        .bind(worker_id)
        .bind(client_name)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(entries)
}

/// Worker's entries, optionally filtered, newest first.
pub async fn find_for_worker(
    pool: &PgPool,
    worker_id: &str,
    client_name: Option<&str>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Vec<Entry>, AppError> {
    let query = format!(
        "SELECT {} FROM entries \
         WHERE worker_id = $1 \
           AND ($2::text IS NULL OR client_name = $2) \
           AND ($3::timestamptz IS NULL OR created_at >= $3) \
           AND ($4::timestamptz IS NULL OR created_at <= $4) \
         ORDER BY created_at DESC",
        ENTRY_COLUMNS
    );
    let entries = sqlx::query_as::<_, Entry>(&query)
        .bind(worker_id)
        .bind(client_name)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(entries)
}
