use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::api::extractors::auth::{current_session, AdminSession};
use std::sync::Arc;

/// Like `AuthAdmin` but a missing, expired or signed-out session is just "nobody".
pub struct MaybeAuthAdmin(pub Option<AdminSession>);

impl<S> FromRequestParts<S> for MaybeAuthAdmin
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        current_session(&app_state, parts).await.map(MaybeAuthAdmin)
    }
}
