//! Invitation-based account provisioning.
//!
//! Lifecycle per email: none -> pending -> consumed or expired. An expired
//! row is deleted lazily when the email is re-invited, which reopens the
//! pending slot. Consumption is exactly-once: the final mark-used step is a
//! conditional update, and a lost race rolls the created account back.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::invitation::{Invitation, InvitationCreatedResponse, InvitationVerifyResponse};
use crate::models::user::{AuthUser, Profile, User, UserRole};
use crate::repositories::{
    InvitationRepository, InvitationRepositoryTrait, UserRepository, UserRepositoryTrait,
};
use crate::services::token;
use crate::utils::password::hash_password;
use crate::validation::rules;

pub struct InvitationWorkflow<I = InvitationRepository, U = UserRepository> {
    invitations: I,
    users: U,
}

impl InvitationWorkflow {
    pub fn new() -> Self {
        Self {
            invitations: InvitationRepository::new(),
            users: UserRepository::new(),
        }
    }
}

impl Default for InvitationWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, U> InvitationWorkflow<I, U>
where
    I: InvitationRepositoryTrait,
    U: UserRepositoryTrait,
{
    pub fn with_repos(invitations: I, users: U) -> Self {
        Self { invitations, users }
    }

    /// Issues an invitation for `email` on behalf of an administrator.
    ///
    /// The raw token leaves this method only inside the returned link; the
    /// stored row carries its hash.
    pub async fn create(
        &self,
        pool: &PgPool,
        config: &Config,
        email: &str,
        requested_by: &AuthUser,
    ) -> Result<InvitationCreatedResponse, AppError> {
        if !requested_by.is_admin() {
            return Err(AppError::Forbidden(
                "Only administrators can send invitations".to_string(),
            ));
        }

        let email = email.trim().to_lowercase();
        let now = Utc::now();

        if self.users.email_exists(pool, &email).await? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }
        if self
            .invitations
            .find_live_by_email(pool, &email, now)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A pending invitation already exists for this email".to_string(),
            ));
        }
        self.invitations
            .delete_expired_for_email(pool, &email, now)
            .await?;

        let raw_token = token::issue_token();
        let invitation = Invitation {
            id: Uuid::new_v4().to_string(),
            email: email.clone(),
            token_hash: token::hash_token(&raw_token),
            invited_by: requested_by.id().to_string(),
            expires_at: now + Duration::days(config.invitation_expiry_days),
            created_at: now,
            used_at: None,
        };
        self.invitations.insert(pool, &invitation).await?;

        tracing::info!(email = %email, invited_by = %requested_by.id(), "Invitation issued");

        Ok(InvitationCreatedResponse {
            id: invitation.id,
            email,
            link: config.invitation_link(&raw_token),
            expires_at: invitation.expires_at,
        })
    }

    /// Read-only token check used by the public signup page. Safe to call
    /// repeatedly.
    pub async fn verify(
        &self,
        pool: &PgPool,
        raw_token: &str,
    ) -> Result<InvitationVerifyResponse, AppError> {
        let invitation = self.find_valid(pool, raw_token, Utc::now()).await?;
        Ok(InvitationVerifyResponse {
            email: invitation.email,
        })
    }

    /// Consumes an invitation: creates the account and its worker profile and
    /// marks the token used, exactly once.
    ///
    /// If the profile write fails after the account write, the account is
    /// deleted and the token stays unconsumed. If another consumer wins the
    /// final mark-used race, this call's account is also rolled back.
    pub async fn consume(
        &self,
        pool: &PgPool,
        raw_token: &str,
        full_name: &str,
        password: &str,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let invitation = self.find_valid(pool, raw_token, now).await?;

        if rules::validate_password_strength(password).is_err() {
            return Err(AppError::Validation(vec![
                "password: must be at least 8 characters".to_string(),
            ]));
        }
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AppError::Validation(vec![
                "full_name: must not be empty".to_string(),
            ]));
        }
        if self.users.email_exists(pool, &invitation.email).await? {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(password)?;
        let user = User::new(invitation.email.clone(), password_hash);
        let user_id = user.id.clone();
        self.users.create_user(pool, &user).await?;

        let profile = Profile::new(user_id.clone(), full_name.to_string(), UserRole::Worker);
        if let Err(err) = self.users.create_profile(pool, &profile).await {
            self.roll_back_account(pool, &user_id).await;
            return Err(err);
        }

        // Final validity re-check: the conditional update admits exactly one
        // consumer.
        let transitioned = self.invitations.mark_used(pool, &invitation.id, now).await?;
        if !transitioned {
            self.roll_back_account(pool, &user_id).await;
            return Err(AppError::TokenUsed(
                "This invitation has already been used".to_string(),
            ));
        }

        tracing::info!(email = %invitation.email, user_id = %user_id, "Invitation consumed");
        Ok(user_id)
    }

    async fn find_valid(
        &self,
        pool: &PgPool,
        raw_token: &str,
        now: DateTime<Utc>,
    ) -> Result<Invitation, AppError> {
        let invitation = self
            .invitations
            .find_by_token_hash(pool, &token::hash_token(raw_token))
            .await?
            .ok_or_else(|| AppError::NotFound("Invitation not found".to_string()))?;

        // Expiry wins over consumption so a stale link always reads as
        // expired.
        if invitation.is_expired(now) {
            return Err(AppError::TokenExpired(
                "This invitation has expired".to_string(),
            ));
        }
        if invitation.is_used() {
            return Err(AppError::TokenUsed(
                "This invitation has already been used".to_string(),
            ));
        }
        Ok(invitation)
    }

    async fn roll_back_account(&self, pool: &PgPool, user_id: &str) {
        if let Err(err) = self.users.delete_user(pool, user_id).await {
            tracing::error!(user_id = %user_id, "Failed to roll back account: {:?}", err);
        }
    }
}
