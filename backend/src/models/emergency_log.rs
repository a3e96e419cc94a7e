use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Append-only record of an SOS trigger attempt, written regardless of
/// dispatch outcome.
pub struct EmergencyLog {
    pub id: String,
    pub client_id: String,
    pub coach_id: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Whether at least one SMS was delivered in real time.
    pub dispatched: bool,
    pub recipient_count: i32,
    /// Human-readable outcome detail (per-recipient errors, fallback reason).
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl EmergencyLog {
    pub fn new(
        client_id: String,
        coach_id: String,
        lat: Option<f64>,
        lng: Option<f64>,
        dispatched: bool,
        recipient_count: i32,
        detail: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            client_id,
            coach_id,
            lat,
            lng,
            dispatched,
            recipient_count,
            detail,
            created_at: Utc::now(),
        }
    }
}
