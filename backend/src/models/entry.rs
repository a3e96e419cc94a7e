//! Field-note entries recorded by coaches after client visits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database representation of a field note.
pub struct Entry {
    /// Unique identifier for the entry.
    pub id: String,
    /// Coach who recorded the note.
    pub worker_id: String,
    /// Client's display name as spoken/entered; billing aggregation matches
    /// entries to clients by this name.
    pub client_name: String,
    /// Coach-assessed status for the visit.
    pub mood: Mood,
    /// Raw speech-to-text transcript.
    pub transcript: String,
    /// AI-formatted note containing zero or more canonical sections.
    pub formatted_note: String,
    /// Hours the consumer worked that day, when reported.
    pub consumer_hours: Option<f64>,
    /// Capture location.
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Creation timestamp; also the calendar day the note belongs to.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type, ToSchema, Default, PartialEq, Eq)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
/// Traffic-light status a coach assigns to a visit.
pub enum Mood {
    #[default]
    Green,
    Yellow,
    Red,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
/// Payload for creating a field note.
pub struct CreateEntryPayload {
    #[validate(length(min = 1, max = 200, message = "Client name is required"))]
    pub client_name: String,
    #[serde(default)]
    pub mood: Mood,
    pub transcript: String,
    pub formatted_note: String,
    pub consumer_hours: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl Entry {
    pub fn new(worker_id: String, payload: CreateEntryPayload, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            worker_id,
            client_name: payload.client_name,
            mood: payload.mood,
            transcript: payload.transcript,
            formatted_note: payload.formatted_note,
            consumer_hours: payload.consumer_hours,
            lat: payload.lat,
            lng: payload.lng,
            created_at: now,
        }
    }
}
