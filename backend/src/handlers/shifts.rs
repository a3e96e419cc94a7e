use axum::{
    extract::{Extension, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::shift::{ClockInRequest, ClockOutRequest, Shift, ShiftStatusResponse},
    models::user::AuthUser,
    repositories::shift as shift_repo,
    utils::csv::csv_document,
};

#[derive(Debug, Deserialize)]
pub struct ShiftRangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn clock_in(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Json(payload): Json<ClockInRequest>,
) -> Result<Json<Shift>, AppError> {
    if shift_repo::find_open_for_worker(&pool, account.id())
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "A shift is already open; clock out first".to_string(),
        ));
    }

    let shift = Shift::start(account.id().to_string(), Utc::now(), payload.lat, payload.lng);
    shift_repo::insert(&pool, &shift).await?;

    tracing::info!(worker_id = %account.id(), shift_id = %shift.id, "Clock-in");
    Ok(Json(shift))
}

pub async fn clock_out(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Json(payload): Json<ClockOutRequest>,
) -> Result<Json<Shift>, AppError> {
    let open = shift_repo::find_open_for_worker(&pool, account.id())
        .await?
        .ok_or_else(|| AppError::NotFound("No open shift to clock out of".to_string()))?;

    let closed = shift_repo::close(&pool, &open.id, Utc::now(), payload.lat, payload.lng).await?;

    tracing::info!(worker_id = %account.id(), shift_id = %closed.id, "Clock-out");
    Ok(Json(closed))
}

pub async fn shift_status(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
) -> Result<Json<ShiftStatusResponse>, AppError> {
    let open = shift_repo::find_open_for_worker(&pool, account.id()).await?;
    let response = match open {
        Some(shift) => ShiftStatusResponse {
            status: "clocked_in".to_string(),
            shift_id: Some(shift.id),
            clock_in_at: Some(shift.clock_in_at),
        },
        None => ShiftStatusResponse {
            status: "clocked_out".to_string(),
            shift_id: None,
            clock_in_at: None,
        },
    };
    Ok(Json(response))
}

pub async fn list_my_shifts(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Query(query): Query<ShiftRangeQuery>,
) -> Result<Json<Vec<Shift>>, AppError> {
    let (from, to) = range_bounds(&config, query.from, query.to)?;
    let shifts = shift_repo::find_for_worker(&pool, account.id(), from, to).await?;
    Ok(Json(shifts))
}

/// CSV export of the worker's own shifts.
pub async fn export_my_shifts(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Query(query): Query<ShiftRangeQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (from, to) = range_bounds(&config, query.from, query.to)?;
    let shifts = shift_repo::find_for_worker(&pool, account.id(), from, to).await?;

    let tz = &config.time_zone;
    let rows: Vec<Vec<String>> = shifts
        .iter()
        .map(|shift| {
            vec![
                shift.local_date(tz).format("%Y-%m-%d").to_string(),
                shift
                    .clock_in_at
                    .with_timezone(tz)
                    .format("%H:%M")
                    .to_string(),
                shift
                    .clock_out_at
                    .map(|at| at.with_timezone(tz).format("%H:%M").to_string())
                    .unwrap_or_default(),
                shift
                    .worked_hours()
                    .map(|h| format!("{:.2}", h))
                    .unwrap_or_default(),
            ]
        })
        .collect();
    let body = csv_document(&["date", "clock_in", "clock_out", "hours"], &rows);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shifts.csv\"".to_string(),
            ),
        ],
        body,
    ))
}

fn range_bounds(
    config: &Config,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<
    (
        Option<chrono::DateTime<Utc>>,
        Option<chrono::DateTime<Utc>>,
    ),
    AppError,
> {
    let tz = &config.time_zone;
    let from = match from {
        Some(date) => Some(
            tz.from_local_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
                .earliest()
                .ok_or_else(|| AppError::BadRequest("Invalid from date".to_string()))?
                .with_timezone(&Utc),
        ),
        None => None,
    };
    let to = match to {
        Some(date) => Some(
            tz.from_local_datetime(&date.and_hms_opt(23, 59, 59).expect("end of day is valid"))
                .latest()
                .ok_or_else(|| AppError::BadRequest("Invalid to date".to_string()))?
                .with_timezone(&Utc),
        ),
        None => None,
    };
    Ok((from, to))
}
