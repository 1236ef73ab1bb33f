use axum::{
    extract::{FromRequestParts, FromRef},
    http::{request::Parts, StatusCode},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::{debug, Span};

pub const SESSION_COOKIE: &str = "admin_session";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Identity carried by an open admin session.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub id: String,
    pub session_id: String,
    pub email: String,
    pub role: String,
    pub csrf_token: String,
}

impl From<Claims> for AdminSession {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            session_id: claims.sid,
            email: claims.email,
            role: claims.role,
            csrf_token: claims.csrf_token,
        }
    }
}

/// Reads the session cookie and checks it against the session store.
/// `Ok(None)` means nobody is signed in.
pub async fn current_session(state: &AppState, parts: &Parts) -> Result<Option<AdminSession>, StatusCode> {
    let Some(cookies) = parts.extensions.get::<Cookies>() else {
        return Ok(None);
    };
    let Some(cookie) = cookies.get(SESSION_COOKIE) else {
        return Ok(None);
    };

    match state.sessions.verify(cookie.value()).await {
        Ok(claims) => Ok(Some(AdminSession::from(claims))),
        Err(crate::error::AppError::Unauthorized) => Ok(None),
        Err(e) => {
            debug!("Session lookup failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Signed-in admin on the allowlist. Mutating requests must echo the CSRF token.
pub struct AuthAdmin(pub AdminSession);

impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let session = current_session(&app_state, parts).await?
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let method = &parts.method;
        if method != "GET" && method != "HEAD" && method != "OPTIONS" {
            let csrf_header_val = parts.headers.get(CSRF_HEADER)
                .ok_or(StatusCode::FORBIDDEN)?
                .to_str()
                .map_err(|_| StatusCode::FORBIDDEN)?;

            if csrf_header_val != session.csrf_token {
                return Err(StatusCode::FORBIDDEN);
            }
        }

        if !app_state.config.is_admin_allowed(&session.email) {
            return Err(StatusCode::FORBIDDEN);
        }

        Span::current().record("admin_id", session.id.as_str());

        Ok(AuthAdmin(session))
    }
}
