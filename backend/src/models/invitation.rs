//! Models for invitation-based account provisioning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of an invitation token.
pub struct Invitation {
    /// Unique identifier for the invitation record.
    pub id: String,
    /// Email address the invitation was issued for.
    pub email: String,
    /// SHA-256 hash of the invitation token (for security).
    pub token_hash: String,
    /// Admin who issued the invitation.
    pub invited_by: String,
    /// Timestamp when this token expires.
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Timestamp when this token was used (null if not yet used).
    pub used_at: Option<DateTime<Utc>>,
}

impl Invitation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for issuing an invitation.
pub struct CreateInvitationPayload {
    /// Email address of the worker being invited.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Returned to the admin after issuing an invitation.
pub struct InvitationCreatedResponse {
    pub id: String,
    pub email: String,
    /// Shareable link carrying the raw token; shown exactly once.
    pub link: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Returned by the public verify endpoint so the signup form can confirm the
/// link before collecting credentials.
pub struct InvitationVerifyResponse {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for consuming an invitation and creating the account.
pub struct AcceptInvitationPayload {
    /// Invitation token from the shared link.
    #[validate(length(min = 32, message = "Invalid invitation token"))]
    pub token: String,
    #[validate(length(min = 1, max = 200, message = "Full name is required"))]
    pub full_name: String,
    #[validate(custom(function = "rules::validate_password_strength"))]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Admin-facing invitation summary (no token material).
pub struct InvitationListItem {
    pub id: String,
    pub email: String,
    pub invited_by: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl InvitationListItem {
    pub fn from_record(invitation: Invitation, now: DateTime<Utc>) -> Self {
        let status = if invitation.is_used() {
            "consumed"
        } else if invitation.is_expired(now) {
            "expired"
        } else {
            "pending"
        };
        Self {
            id: invitation.id,
            email: invitation.email,
            invited_by: invitation.invited_by,
            expires_at: invitation.expires_at,
            created_at: invitation.created_at,
            used_at: invitation.used_at,
            status: status.to_string(),
        }
    }
}
