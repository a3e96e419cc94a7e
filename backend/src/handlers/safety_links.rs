use axum::{
    extract::{Extension, Path, State},
    Json,
};
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::emergency_log::EmergencyLog,
    models::safety_token::SafetyLinkResponse,
    models::user::AuthUser,
    repositories::{client as client_repo, emergency_log as log_repo},
    services::SafetyLinkWorkflow,
};

/// Coach: create or re-surface the client's safety link.
pub async fn generate_safety_link(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Path(client_id): Path<String>,
) -> Result<Json<SafetyLinkResponse>, AppError> {
    let workflow = SafetyLinkWorkflow::new();
    let response = workflow
        .generate(&pool, &config, &client_id, &account)
        .await?;
    Ok(Json(response))
}

/// Coach: revoke the client's live safety link.
pub async fn revoke_safety_link(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Path(client_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let workflow = SafetyLinkWorkflow::new();
    workflow.revoke(&pool, &client_id, &account).await?;
    Ok(Json(serde_json::json!({ "revoked": true })))
}

/// Coach: recent SOS alerts for one of their clients, newest first.
pub async fn list_emergency_alerts(
    State((pool, _config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Path(client_id): Path<String>,
) -> Result<Json<Vec<EmergencyLog>>, AppError> {
    client_repo::find_for_coach(&pool, &client_id, account.id())
        .await?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    let alerts = log_repo::list_for_client(&pool, &client_id, 50).await?;
    Ok(Json(alerts))
}
