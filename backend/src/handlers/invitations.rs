use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::invitation::{
        AcceptInvitationPayload, CreateInvitationPayload, InvitationCreatedResponse,
        InvitationListItem, InvitationVerifyResponse,
    },
    models::user::AuthUser,
    repositories::{InvitationRepository, InvitationRepositoryTrait},
    services::InvitationWorkflow,
    utils::email::EmailService,
};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// Admin: issue an invitation and email the link best-effort.
pub async fn create_invitation(
    State((pool, config)): State<(PgPool, Config)>,
    Extension(account): Extension<AuthUser>,
    Json(payload): Json<CreateInvitationPayload>,
) -> Result<Json<InvitationCreatedResponse>, AppError> {
    payload.validate()?;

    let workflow = InvitationWorkflow::new();
    let created = workflow
        .create(&pool, &config, &payload.email, &account)
        .await?;

    // The admin still receives the link when mail delivery is unavailable.
    match EmailService::new() {
        Ok(service) => {
            if let Err(err) = service.send_invitation_email(
                &created.email,
                &created.link,
                config.invitation_expiry_days,
            ) {
                tracing::warn!(email = %created.email, "Invitation email failed: {:?}", err);
            }
        }
        Err(err) => tracing::warn!("Email service unavailable: {:?}", err),
    }

    Ok(Json(created))
}

/// Admin: list every invitation with its lifecycle status.
pub async fn list_invitations(
    State((pool, _config)): State<(PgPool, Config)>,
) -> Result<Json<Vec<InvitationListItem>>, AppError> {
    let repo = InvitationRepository::new();
    let now = Utc::now();
    let items = repo
        .list_all(&pool)
        .await?
        .into_iter()
        .map(|invitation| InvitationListItem::from_record(invitation, now))
        .collect();
    Ok(Json(items))
}

/// Admin: withdraw an invitation.
pub async fn delete_invitation(
    State((pool, _config)): State<(PgPool, Config)>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = InvitationRepository::new();
    let removed = repo.delete(&pool, &id).await?;
    if !removed {
        return Err(AppError::NotFound("Invitation not found".to_string()));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Public: confirm an invitation link before showing the signup form.
pub async fn verify_invitation(
    State((pool, _config)): State<(PgPool, Config)>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<InvitationVerifyResponse>, AppError> {
    let workflow = InvitationWorkflow::new();
    let verified = workflow.verify(&pool, &query.token).await?;
    Ok(Json(verified))
}

/// Public: consume the invitation and provision the account.
pub async fn accept_invitation(
    State((pool, _config)): State<(PgPool, Config)>,
    Json(payload): Json<AcceptInvitationPayload>,
) -> Result<Json<serde_json::Value>, AppError> {
    payload.validate()?;

    let workflow = InvitationWorkflow::new();
    let user_id = workflow
        .consume(&pool, &payload.token, &payload.full_name, &payload.password)
        .await?;
    Ok(Json(serde_json::json!({ "user_id": user_id })))
}
