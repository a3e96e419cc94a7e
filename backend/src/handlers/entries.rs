use axum::{
    extract::{Extension, Query, State},
    Json,
};
use chrono::{NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::entry::{CreateEntryPayload, Entry},
    models::user::AuthUser,
    repositories::entry as entry_repo,
};

#[derive(Debug, Deserialize)]
pub struct EntryListQuery {
    pub client: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

pub async fn create_entry(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Json(payload): Json<CreateEntryPayload>,
) -> Result<Json<Entry>, AppError> {
    payload.validate()?;

    let entry = Entry::new(account.id().to_string(), payload, Utc::now());
    entry_repo::insert(&pool, &entry).await?;
    Ok(Json(entry))
}

pub async fn list_my_entries(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Query(query): Query<EntryListQuery>,
) -> Result<Json<Vec<Entry>>, AppError> {
    let tz = &config.time_zone;
    let from = match query.from {
        Some(date) => Some(
            tz.from_local_datetime(&date.and_hms_opt(0, 0, 0).expect("midnight is valid"))
                .earliest()
                .ok_or_else(|| AppError::BadRequest("Invalid from date".to_string()))?
                .with_timezone(&Utc),
        ),
        None => None,
    };
    let to = match query.to {
        Some(date) => Some(
            tz.from_local_datetime(&date.and_hms_opt(23, 59, 59).expect("end of day is valid"))
                .latest()
                .ok_or_else(|| AppError::BadRequest("Invalid to date".to_string()))?
                .with_timezone(&Utc),
        ),
        None => None,
    };

    let entries = entry_repo::find_for_worker(
        &pool,
        account.id(),
        query.client.as_deref(),
        from,
        to,
    )
    .await?;
    Ok(Json(entries))
}
