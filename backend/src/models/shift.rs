use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Shift {
    pub id: String,
    pub worker_id: String,
    pub clock_in_at: DateTime<Utc>,
    pub clock_in_lat: Option<f64>,
    pub clock_in_lng: Option<f64>,
    pub clock_out_at: Option<DateTime<Utc>>,
    pub clock_out_lat: Option<f64>,
    pub clock_out_lng: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClockInRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClockOutRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShiftStatusResponse {
    pub status: String,
    pub shift_id: Option<String>,
    pub clock_in_at: Option<DateTime<Utc>>,
}

impl Shift {
    pub fn start(worker_id: String, now: DateTime<Utc>, lat: Option<f64>, lng: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            worker_id,
            clock_in_at: now,
            clock_in_lat: lat,
            clock_in_lng: lng,
            clock_out_at: None,
            clock_out_lat: None,
            clock_out_lng: None,
            created_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.clock_out_at.is_none()
    }

    /// Worked hours for a closed shift; `None` while the shift is open.
    pub fn worked_hours(&self) -> Option<f64> {
        self.clock_out_at
            .map(|out| (out - self.clock_in_at).num_minutes() as f64 / 60.0)
    }

    /// Calendar date of the clock-in, used to match entries to shift days.
    pub fn local_date(&self, tz: &chrono_tz::Tz) -> NaiveDate {
        self.clock_in_at.with_timezone(tz).date_naive()
    }
}
