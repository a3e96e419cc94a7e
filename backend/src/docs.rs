//! OpenAPI schema catalogue served at /api/docs/openapi.json.

use axum::Json;
use utoipa::OpenApi;

use crate::models::{
    client::{Client, CreateClientPayload, UpdateClientPayload},
    emergency_log::EmergencyLog,
    entry::{CreateEntryPayload, Entry, Mood},
    invitation::{
        AcceptInvitationPayload, CreateInvitationPayload, InvitationCreatedResponse,
        InvitationListItem, InvitationVerifyResponse,
    },
    safety_token::{AlertResult, SafetyLinkResponse, SosVerifyResponse, TriggerAlertPayload},
    shift::{ClockInRequest, ClockOutRequest, Shift, ShiftStatusResponse},
    user::{AccountSummary, LoginRequest, LoginResponse, UserResponse, UserRole},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "coachlog API",
        description = "Field reporting backend for job coaches: shifts, field notes, clients, billing reports, invitations, and emergency safety links."
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        UserResponse,
        UserRole,
        AccountSummary,
        Client,
        CreateClientPayload,
        UpdateClientPayload,
        Shift,
        ClockInRequest,
        ClockOutRequest,
        ShiftStatusResponse,
        Entry,
        Mood,
        CreateEntryPayload,
        CreateInvitationPayload,
        InvitationCreatedResponse,
        InvitationVerifyResponse,
        AcceptInvitationPayload,
        InvitationListItem,
        SafetyLinkResponse,
        TriggerAlertPayload,
        AlertResult,
        SosVerifyResponse,
        EmergencyLog,
    ))
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
