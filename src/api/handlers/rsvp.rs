use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::IntoResponse,
    Json,
};
use tracing::{info, warn};

use crate::api::dtos::requests::{PartyQuery, SubmitRsvpRequest};
use crate::api::dtos::responses::{PartyResponse, SubmitRsvpResponse};
use crate::domain::services::notification::EmailSummary;
use crate::domain::services::rsvp_service::SubmissionOutcome;
use crate::error::AppError;
use crate::state::AppState;

pub async fn submit_rsvp(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitRsvpRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| {
        warn!("Unreadable RSVP payload: {}", e);
        AppError::Validation("Invalid request body.".into())
    })?;

    let submission = payload.into_submission()?;

    let response = match state.rsvp_service.submit(submission).await? {
        SubmissionOutcome::Locked { group_id } => SubmitRsvpResponse {
            ok: true,
            id: None,
            duplicate: false,
            locked: true,
            group_id: Some(group_id),
            party_size: 0,
            email: None,
        },
        SubmissionOutcome::Saved { record, duplicate, party, notifications } => SubmitRsvpResponse {
            ok: true,
            id: Some(record.id.clone()),
            duplicate,
            locked: false,
            group_id: record.group().map(str::to_string),
            party_size: party.len(),
            email: Some(EmailSummary::from(&notifications)),
        },
    };

    Ok(Json(response))
}

/// Pre-fills the party step of the form. Never fails: anything unexpected reads as
/// "no party found".
pub async fn get_party(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PartyQuery>,
) -> Json<PartyResponse> {
    let first_name = query.first_name.unwrap_or_default();
    let last_name = query.last_name.unwrap_or_default();

    let Some(party) = state.rsvp_service.resolver().lookup(&first_name, &last_name).await else {
        return Json(PartyResponse::not_found());
    };

    let locked = match state.rsvp_service.is_locked(&party.group_id).await {
        Ok(locked) => locked,
        Err(e) => {
            warn!("Lock check for group {} failed: {}", party.group_id, e);
            false
        }
    };

    info!("Party {} resolved with {} members (locked: {})", party.group_id, party.members.len(), locked);
    Json(PartyResponse::from_party(party, locked))
}
