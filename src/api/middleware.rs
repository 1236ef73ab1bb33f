use std::sync::Arc;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use reqwest::Url;
use tracing::{info, Span};

use crate::api::extractors::maybe_auth::MaybeAuthAdmin;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/admin/login";

/// Gate for everything under `/admin` except the login page.
pub async fn admin_guard(
    State(state): State<Arc<AppState>>,
    MaybeAuthAdmin(session): MaybeAuthAdmin,
    request: Request,
    next: Next,
) -> Response {
    let original = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let Some(session) = session else {
        info!("Unauthenticated request to {}, redirecting to login", original);
        return Redirect::to(&login_redirect(&original)).into_response();
    };

    if !state.config.is_admin_allowed(&session.email) {
        info!("{} is not on the admin allowlist", session.email);
        return Redirect::to("/").into_response();
    }

    Span::current().record("admin_id", session.id.as_str());
    next.run(request).await
}

/// `/admin/login?redirect=<original>` with the original path+query form-encoded.
pub fn login_redirect(original: &str) -> String {
    match Url::parse_with_params("http://localhost/admin/login", &[("redirect", original)]) {
        Ok(url) => format!("{}?{}", url.path(), url.query().unwrap_or_default()),
        Err(_) => LOGIN_PATH.to_string(),
    }
}

/// Only same-site absolute paths are honored after login.
pub fn safe_redirect_target(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(target) if target.starts_with('/') && !target.starts_with("//") && !target.starts_with(LOGIN_PATH) => target.to_string(),
        _ => "/admin".to_string(),
    }
}
