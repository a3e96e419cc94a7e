use axum::{
    extract::{Extension, Path, State},
    Json,
};
use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::client::{Client, CreateClientPayload, UpdateClientPayload},
    models::user::AuthUser,
    repositories::client as client_repo,
};

pub async fn create_client(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Json(payload): Json<CreateClientPayload>,
) -> Result<Json<Client>, AppError> {
    payload.validate()?;

    let mut client = Client::new(account.id().to_string(), payload.full_name.trim().to_string());
    client.counselor = payload.counselor;
    client.vendor = payload.vendor;
    client.hourly_wage = payload.hourly_wage;
    client.ipe_goal = payload.ipe_goal;
    client.emergency_contact_name = payload.emergency_contact_name;
    client.emergency_contact_phone = payload.emergency_contact_phone;

    client_repo::insert(&pool, &client).await?;
    Ok(Json(client))
}

pub async fn list_clients(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = client_repo::list_for_coach(&pool, account.id()).await?;
    Ok(Json(clients))
}

pub async fn get_client(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Client>, AppError> {
    let client = client_repo::find_for_coach(&pool, &id, account.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
    Ok(Json(client))
}

pub async fn update_client(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientPayload>,
) -> Result<Json<Client>, AppError> {
    payload.validate()?;

    let mut client = client_repo::find_for_coach(&pool, &id, account.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
    client.updated_at = Utc::now();

    let updated = client_repo::update(&pool, &client, &payload).await?;
    Ok(Json(updated))
}

pub async fn delete_client(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let removed = client_repo::delete(&pool, &id, account.id()).await?;
    if !removed {
        return Err(AppError::NotFound("Client not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}
