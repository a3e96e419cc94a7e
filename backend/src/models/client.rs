//! Models for clients (consumers) receiving job-coaching services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::rules;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a client and their case-management metadata.
pub struct Client {
    /// Unique identifier for the client.
    pub id: String,
    /// Coach who owns this client. All access is scoped to the owner.
    pub coach_id: String,
    /// Display name; field-note entries reference clients by this name.
    pub full_name: String,
    /// Assigned VR counselor, if any.
    pub counselor: Option<String>,
    /// Billing vendor, if any.
    pub vendor: Option<String>,
    /// Hourly wage used on billing reports.
    pub hourly_wage: Option<f64>,
    /// Individual Plan for Employment goal text.
    pub ipe_goal: Option<String>,
    /// Emergency contact name for SOS alerts.
    pub emergency_contact_name: Option<String>,
    /// Emergency contact phone for SOS alerts.
    pub emergency_contact_phone: Option<String>,
    /// Creation timestamp for auditing.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp for auditing.
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(coach_id: String, full_name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id,
            full_name,
            counselor: None,
            vendor: None,
            hourly_wage: None,
            ipe_goal: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating a new client.
pub struct CreateClientPayload {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub full_name: String,
    pub counselor: Option<String>,
    pub vendor: Option<String>,
    pub hourly_wage: Option<f64>,
    pub ipe_goal: Option<String>,
    pub emergency_contact_name: Option<String>,
    #[validate(custom(function = "rules::validate_optional_phone"))]
    pub emergency_contact_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for updating portions of an existing client.
pub struct UpdateClientPayload {
    #[validate(length(min = 1, max = 200, message = "Name must not be empty"))]
    pub full_name: Option<String>,
    pub counselor: Option<String>,
    pub vendor: Option<String>,
    pub hourly_wage: Option<f64>,
    pub ipe_goal: Option<String>,
    pub emergency_contact_name: Option<String>,
    #[validate(custom(function = "rules::validate_optional_phone"))]
    pub emergency_contact_phone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn create_payload_rejects_empty_name() {
        let payload = CreateClientPayload {
            full_name: "".into(),
            counselor: None,
            vendor: None,
            hourly_wage: None,
            ipe_goal: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn create_payload_rejects_bad_phone() {
        let payload = CreateClientPayload {
            full_name: "Chris Pratt".into(),
            counselor: None,
            vendor: None,
            hourly_wage: None,
            ipe_goal: None,
            emergency_contact_name: Some("Mom".into()),
            emergency_contact_phone: Some("not-a-number".into()),
        };
        assert!(payload.validate().is_err());
    }
}
