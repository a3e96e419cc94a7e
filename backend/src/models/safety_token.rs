//! Models for the client-facing emergency safety link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a client safety token.
///
/// Stored verbatim rather than hashed: a generate call for a client with a
/// live token must return the existing link unchanged.
pub struct SafetyToken {
    /// Unique identifier for the token record.
    pub id: String,
    /// Client this token belongs to.
    pub client_id: String,
    /// Opaque bearer token embedded in the safety link.
    pub token: String,
    /// Coach who generated the token.
    pub created_by: String,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Timestamp when this token was revoked (null while active).
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SafetyToken {
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Returned when a coach requests a safety link for a client.
pub struct SafetyLinkResponse {
    pub token: String,
    pub link: String,
    /// `true` when an already-active token was returned instead of a new one.
    pub is_existing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Public SOS trigger payload. Unauthenticated; the token is the credential.
pub struct TriggerAlertPayload {
    pub token: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Outcome of an SOS trigger.
///
/// When `use_fallback` is set the caller must present the composed message and
/// phone numbers for manual sending (no gateway configured, no recipients, or
/// every send failed).
pub struct AlertResult {
    pub dispatched: bool,
    pub use_fallback: bool,
    pub message: String,
    pub recipients: Vec<String>,
    pub sent: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
/// Returned by the public SOS verify endpoint before the alert is triggered.
pub struct SosVerifyResponse {
    pub client_name: String,
}
