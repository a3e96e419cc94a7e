//! Shift repository: clock-in/out rows with GPS coordinates.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::shift::Shift;

const SHIFT_COLUMNS: &str = "id, worker_id, clock_in_at, clock_in_lat, clock_in_lng, \
                             clock_out_at, clock_out_lat, clock_out_lng, created_at";

/// The worker's open shift, if any. At most one exists by workflow contract.
pub async fn find_open_for_worker(
    pool: &PgPool,
    worker_id: &str,
) -> Result<Option<Shift>, AppError> {
    let query = format!(
        "SELECT {} FROM shifts \
         WHERE worker_id = $1 AND clock_out_at IS NULL \
         ORDER BY clock_in_at DESC LIMIT 1",
        SHIFT_COLUMNS
    );
    let shift = sqlx::query_as::<_, Shift>(&query)
        .bind(worker_id)
        .fetch_optional(pool)
        .await?;
    Ok(shift)
}

pub async fn insert(pool: &PgPool, shift: &Shift) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO shifts \
         (id, worker_id, clock_in_at, clock_in_lat, clock_in_lng, \
          clock_out_at, clock_out_lat, clock_out_lng, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(&shift.id)
    .bind(&shift.worker_id)
    .bind(shift.clock_in_at)
    .bind(shift.clock_in_lat)
    .bind(shift.clock_in_lng)
    .bind(shift.clock_out_at)
    .bind(shift.clock_out_lat)
    .bind(shift.clock_out_lng)
    .bind(shift.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn close(
    pool: &PgPool,
    shift_id: &str,
    at: DateTime<Utc>,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Shift, AppError> {
    let query = format!(
        "UPDATE shifts SET clock_out_at = $1, clock_out_lat = $2, clock_out_lng = $3 \
         WHERE id = $4 RETURNING {}",
        SHIFT_COLUMNS
    );
    let shift = sqlx::query_as::<_, Shift>(&query)
        .bind(at)
        .bind(lat)
        .bind(lng)
        .bind(shift_id)
        .fetch_one(pool)
        .await?;
    Ok(shift)
}

/// Closed shifts for the worker inside the window, oldest first.
pub async fn find_closed_in_range(
    pool: &PgPool,
    worker_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<Shift>, AppError> {
    let query = format!(
        "SELECT {} FROM shifts \
         WHERE worker_id = $1 AND clock_out_at IS NOT NULL \
           AND clock_in_at >= $2 AND clock_in_at <= $3 \
         ORDER BY clock_in_at",
        SHIFT_COLUMNS
    );
    let shifts = sqlx::query_as::<_, Shift>(&query)
        .bind(worker_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(shifts)
}

/// All shifts for the worker, optionally bounded, newest first.
pub async fn find_for_worker(
    pool: &PgPool,
    worker_id: &str,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> Result<Vec<Shift>, AppError> {
    let query = format!(
        "SELECT {} FROM shifts \
         WHERE worker_id = $1 \
           AND ($2::timestamptz IS NULL OR clock_in_at >= $2) \
           AND ($3::timestamptz IS NULL OR clock_in_at <= $3) \
         ORDER BY clock_in_at DESC",
        SHIFT_COLUMNS
    );
    let shifts = sqlx::query_as::<_, Shift>(&query)
        .bind(worker_id)
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await?;
    Ok(shifts)
}
