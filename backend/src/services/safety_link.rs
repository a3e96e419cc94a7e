//! Client safety-link lifecycle and the public SOS trigger.
//!
//! Lifecycle per client: none -> active -> revoked; revoked returns to
//! active only through a fresh generate call, which issues a new token.
//! The trigger path is unauthenticated; the token is the whole credential.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::emergency_log::EmergencyLog;
use crate::models::safety_token::{AlertResult, SafetyLinkResponse, SafetyToken, SosVerifyResponse};
use crate::models::user::AuthUser;
use crate::repositories::{
    ClientRepository, ClientRepositoryTrait, EmergencyLogRepository, EmergencyLogRepositoryTrait,
    SafetyTokenRepository, SafetyTokenRepositoryTrait, UserRepository, UserRepositoryTrait,
};
use crate::services::dispatch::{self, DispatchError, SmsSender};
use crate::services::token;
use crate::utils::time;

const INVALID_LINK_MESSAGE: &str = "This safety link is not valid";

pub struct SafetyLinkWorkflow<
    T = SafetyTokenRepository,
    C = ClientRepository,
    U = UserRepository,
    L = EmergencyLogRepository,
> {
    tokens: T,
    clients: C,
    users: U,
    logs: L,
}

impl SafetyLinkWorkflow {
    pub fn new() -> Self {
        Self {
            tokens: SafetyTokenRepository::new(),
            clients: ClientRepository::new(),
            users: UserRepository::new(),
            logs: EmergencyLogRepository::new(),
        }
    }
}

impl Default for SafetyLinkWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, U, L> SafetyLinkWorkflow<T, C, U, L>
where
    T: SafetyTokenRepositoryTrait,
    C: ClientRepositoryTrait,
    U: UserRepositoryTrait,
    L: EmergencyLogRepositoryTrait,
{
    pub fn with_repos(tokens: T, clients: C, users: U, logs: L) -> Self {
        Self {
            tokens,
            clients,
            users,
            logs,
        }
    }

    /// Returns the client's live safety link, issuing a new token only when
    /// none is active. Idempotent while a token stays live.
    pub async fn generate(
        &self,
        pool: &PgPool,
        config: &Config,
        client_id: &str,
        requested_by: &AuthUser,
    ) -> Result<SafetyLinkResponse, AppError> {
        let client = self
            .clients
            .find_by_id(pool, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
        if client.coach_id != requested_by.id() {
            return Err(AppError::Forbidden(
                "You do not manage this client".to_string(),
            ));
        }

        if let Some(existing) = self.tokens.find_active_by_client(pool, client_id).await? {
            return Ok(SafetyLinkResponse {
                link: config.safety_link(&existing.token),
                token: existing.token,
                is_existing: true,
            });
        }

        let raw_token = token::issue_token();
        let record = SafetyToken {
            id: Uuid::new_v4().to_string(),
            client_id: client.id.clone(),
            token: raw_token.clone(),
            created_by: requested_by.id().to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        };
        self.tokens.insert(pool, &record).await?;

        tracing::info!(client_id = %client.id, coach_id = %requested_by.id(), "Safety link issued");

        Ok(SafetyLinkResponse {
            link: config.safety_link(&raw_token),
            token: raw_token,
            is_existing: false,
        })
    }

    /// Revokes the client's live safety link.
    pub async fn revoke(
        &self,
        pool: &PgPool,
        client_id: &str,
        requested_by: &AuthUser,
    ) -> Result<(), AppError> {
        let client = self
            .clients
            .find_by_id(pool, client_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;
        if client.coach_id != requested_by.id() {
            return Err(AppError::Forbidden(
                "You do not manage this client".to_string(),
            ));
        }

        let record = self
            .tokens
            .find_active_by_client(pool, client_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No active safety link for this client".to_string())
            })?;

        // Conditional update; a concurrent revoke winning the race is still a
        // success from the caller's point of view.
        self.tokens.revoke(pool, &record.id, Utc::now()).await?;

        tracing::info!(client_id = %client_id, coach_id = %requested_by.id(), "Safety link revoked");
        Ok(())
    }

    /// Public pre-trigger check so the SOS page can greet the client.
    pub async fn verify(&self, pool: &PgPool, raw_token: &str) -> Result<SosVerifyResponse, AppError> {
        let (_, client) = self.resolve_active(pool, raw_token).await?;
        Ok(SosVerifyResponse {
            client_name: client.full_name,
        })
    }

    /// Public SOS trigger. Composes the alert, fans it out over SMS, and
    /// records the attempt whatever the dispatch outcome.
    pub async fn trigger(
        &self,
        pool: &PgPool,
        config: &Config,
        sender: Option<Arc<dyn SmsSender>>,
        raw_token: &str,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<AlertResult, AppError> {
        let (record, client) = self.resolve_active(pool, raw_token).await?;

        let coach_name = self
            .users
            .find_profile_by_user_id(pool, &client.coach_id)
            .await?
            .map(|profile| profile.full_name)
            .unwrap_or_else(|| "their coach".to_string());

        let location = match (lat, lng) {
            // Debug formatting keeps a trailing ".0" on whole-degree
            // coordinates, so the link is unambiguous in the SMS body.
            (Some(lat), Some(lng)) => format!("https://www.google.com/maps?q={:?},{:?}", lat, lng),
            _ => "Location unavailable".to_string(),
        };
        let message = format!(
            "EMERGENCY ALERT: {} has triggered their safety link. Coach: {}. Time: {}. Location: {}",
            client.full_name,
            coach_name,
            time::human_timestamp(Utc::now(), &config.time_zone),
            location,
        );

        let mut recipients = config.emergency_numbers.clone();
        if let Some(phone) = client
            .emergency_contact_phone
            .as_ref()
            .filter(|p| !p.is_empty())
        {
            recipients.push(phone.clone());
        }

        let (dispatched, sent, failed, detail) = match sender {
            None => (
                false,
                0,
                0,
                Some("no SMS gateway configured".to_string()),
            ),
            Some(sender) => match dispatch::dispatch(sender, &message, &recipients).await {
                Ok(result) => {
                    let detail = (!result.errors.is_empty()).then(|| {
                        result
                            .errors
                            .iter()
                            .map(|e| format!("{}: {}", e.recipient, e.error))
                            .collect::<Vec<_>>()
                            .join("; ")
                    });
                    (true, result.sent, result.failed, detail)
                }
                Err(DispatchError::NoRecipientsConfigured) => (
                    false,
                    0,
                    0,
                    Some("no notification recipients configured".to_string()),
                ),
                Err(DispatchError::DeliveryFailed { details, errors }) => {
                    (false, 0, errors.len(), Some(details))
                }
            },
        };

        tracing::warn!(
            client_id = %client.id,
            coach_id = %client.coach_id,
            lat = ?lat,
            lng = ?lng,
            dispatched,
            "SOS trigger"
        );

        let log = EmergencyLog::new(
            client.id.clone(),
            client.coach_id.clone(),
            lat,
            lng,
            dispatched,
            recipients.len() as i32,
            detail,
        );
        // The alert outcome must reach the caller even if the audit write
        // fails.
        if let Err(err) = self.logs.insert(pool, &log).await {
            tracing::error!(token_id = %record.id, "Failed to record emergency log: {:?}", err);
        }

        Ok(AlertResult {
            dispatched,
            use_fallback: !dispatched,
            message,
            recipients,
            sent,
            failed,
        })
    }

    async fn resolve_active(
        &self,
        pool: &PgPool,
        raw_token: &str,
    ) -> Result<(SafetyToken, crate::models::client::Client), AppError> {
        let record = self
            .tokens
            .find_active_by_token(pool, raw_token)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_LINK_MESSAGE.to_string()))?;
        let client = self
            .clients
            .find_by_id(pool, &record.client_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_LINK_MESSAGE.to_string()))?;
        Ok((record, client))
    }
}
