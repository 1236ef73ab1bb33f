use std::convert::Infallible;
use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{sse::{Event, KeepAlive, Sse}, IntoResponse},
    Json,
};
use futures::{Stream, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::api::dtos::requests::{ChangesQuery, RsvpListQuery, UpdateRsvpRequest};
use crate::api::dtos::responses::{LockReleasedResponse, RsvpListResponse};
use crate::api::extractors::auth::AuthAdmin;
use crate::domain::models::change::{ChangeEvent, ChangeKind, TABLE_GROUP_LOCKS, TABLE_RSVPS};
use crate::domain::services::dashboard;
use crate::domain::services::deadline::with_deadline;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_rsvps(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
    Query(query): Query<RsvpListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = with_deadline(state.config.store_timeout, "rsvp list", state.rsvp_repo.list_all()).await?;
    let rsvps: Vec<_> = dashboard::filter(&rows, query.q.as_deref(), query.group.as_deref())
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(RsvpListResponse { total: rsvps.len(), rsvps }))
}

pub async fn update_rsvp(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRsvpRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attending = match payload.attending {
        Some(value) => value,
        None => {
            let current = with_deadline(state.config.store_timeout, "rsvp lookup", state.rsvp_repo.find_by_id(&id)).await?
                .ok_or(AppError::NotFound("RSVP not found".into()))?;
            !current.attending
        }
    };

    let updated = with_deadline(state.config.store_timeout, "rsvp update", state.rsvp_repo.update_attending(&id, attending)).await?;
    publish(&state, TABLE_RSVPS, ChangeKind::Update, &updated).await;

    info!("Admin {} set rsvp {} attending={}", admin.id, id, attending);
    Ok(Json(updated))
}

pub async fn delete_rsvp(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let existing = with_deadline(state.config.store_timeout, "rsvp lookup", state.rsvp_repo.find_by_id(&id)).await?
        .ok_or(AppError::NotFound("RSVP not found".into()))?;

    with_deadline(state.config.store_timeout, "rsvp delete", state.rsvp_repo.delete(&id)).await?;
    publish(&state, TABLE_RSVPS, ChangeKind::Delete, &existing).await;

    info!("Admin {} deleted rsvp {}", admin.id, id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let rows = with_deadline(state.config.store_timeout, "rsvp list", state.rsvp_repo.list_all()).await?;
    Ok(Json(dashboard::groups(&rows)))
}

pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    AuthAdmin(_admin): AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let rows = with_deadline(state.config.store_timeout, "rsvp list", state.rsvp_repo.list_all()).await?;
    Ok(Json(dashboard::stats(&rows, state.config.venue_capacity)))
}

/// Re-opens a group so its party can submit again.
pub async fn release_lock(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Path(group_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let released = with_deadline(state.config.store_timeout, "group unlock", state.lock_repo.release(&group_id)).await?;
    if released {
        publish(&state, TABLE_GROUP_LOCKS, ChangeKind::Delete, &serde_json::json!({ "group_id": group_id })).await;
        info!("Admin {} released lock for group {}", admin.id, group_id);
    }

    Ok(Json(LockReleasedResponse { group_id, released }))
}

/// Server-sent events for one table. Each event is the JSON `ChangeEvent`.
pub async fn stream_changes(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
    Query(query): Query<ChangesQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let changes = state.change_feed.subscribe(&query.table).await?;
    info!("Admin {} subscribed to {} changes", admin.id, query.table);

    let events = changes.filter_map(|change| async move {
        match Event::default().json_data(&change) {
            Ok(event) => Some(Ok(event)),
            Err(e) => {
                warn!("Dropping unserializable change event: {}", e);
                None
            }
        }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

async fn publish<T: Serialize>(state: &AppState, table: &str, kind: ChangeKind, row: &T) {
    if let Err(e) = state.change_feed.publish(ChangeEvent::new(table, kind, row)).await {
        warn!("Change feed publish failed: {}", e);
    }
}
