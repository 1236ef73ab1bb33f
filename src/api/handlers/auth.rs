use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::api::dtos::requests::LoginRequest;
use crate::api::extractors::{auth::{AuthAdmin, SESSION_COOKIE}, maybe_auth::MaybeAuthAdmin};
use crate::state::AppState;
use crate::error::AppError;
use crate::domain::models::auth::{AdminProfile, SignInResponse};
use crate::domain::services::admin_accounts::verify_password;
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use tracing::{info, warn};

pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let admin = state.admin_repo.find_by_email(&payload.email).await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&admin.password_hash, &payload.password)? {
        warn!("Failed sign-in for {}", admin.email);
        return Err(AppError::Unauthorized);
    }

    let signed_in = state.sessions.sign_in(&admin).await?;

    let mut cookie = Cookie::new(SESSION_COOKIE, signed_in.access_token);
    cookie.set_http_only(true);
    cookie.set_secure(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_max_age(time::Duration::seconds(state.sessions.ttl().as_secs() as i64));
    cookies.add(cookie);

    info!("Admin signed in: {}", admin.id);

    Ok(Json(SignInResponse {
        csrf_token: signed_in.csrf_token,
        expires_at: signed_in.expires_at,
        admin: AdminProfile {
            id: admin.id,
            email: admin.email,
            role: admin.role,
        },
    }))
}

/// Closes the server-side session and clears the cookie. Always succeeds for the browser.
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    MaybeAuthAdmin(session): MaybeAuthAdmin,
    cookies: Cookies,
) -> Result<impl IntoResponse, AppError> {
    if let Some(session) = session
        && let Err(e) = state.sessions.sign_out(&session.session_id).await {
        warn!("Closing session {} failed: {}", session.session_id, e);
    }

    cookies.remove(Cookie::build((SESSION_COOKIE, "")).path("/").into());

    info!("Admin signed out");

    Ok(StatusCode::OK)
}

/// Current admin, as seen by the open session.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthAdmin(session): AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let admin = state.admin_repo.find_by_id(&session.id).await?
        .ok_or(AppError::Unauthorized)?;

    Ok(Json(AdminProfile {
        id: admin.id,
        email: admin.email,
        role: admin.role,
    }))
}
