//! Public SOS endpoints. No authentication: the safety token is the
//! credential, and responses never reveal more than the documented messages.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use sqlx::PgPool;

use crate::{
    config::Config,
    error::AppError,
    models::safety_token::{AlertResult, SosVerifyResponse, TriggerAlertPayload},
    services::dispatch::{SmsSender, TwilioSender},
    services::SafetyLinkWorkflow,
};

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

/// Public: resolve the token so the SOS page can greet the client.
pub async fn verify_sos_token(
    State((pool, _config)): State<(PgPool, Config)>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<SosVerifyResponse>, AppError> {
    let workflow = SafetyLinkWorkflow::new();
    let verified = workflow.verify(&pool, &query.token).await?;
    Ok(Json(verified))
}

/// Public: trigger the emergency alert.
pub async fn trigger_sos(
    State((pool, config)): State<(PgPool, Config)>,
    Json(payload): Json<TriggerAlertPayload>,
) -> Result<Json<AlertResult>, AppError> {
    let sender: Option<Arc<dyn SmsSender>> = TwilioSender::from_config(&config)
        .map(|sender| Arc::new(sender) as Arc<dyn SmsSender>);

    let workflow = SafetyLinkWorkflow::new();
    let result = workflow
        .trigger(
            &pool,
            &config,
            sender,
            &payload.token,
            payload.lat,
            payload.lng,
        )
        .await?;
    Ok(Json(result))
}
