use std::sync::Arc;
use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse},
};
use tera::Context;

use crate::api::dtos::requests::LoginPageQuery;
use crate::api::extractors::auth::AuthAdmin;
use crate::api::middleware::safe_redirect_target;
use crate::domain::services::notification::{ADMIN_DASHBOARD_PAGE, ADMIN_LOGIN_PAGE};
use crate::error::AppError;
use crate::state::AppState;

pub async fn login_page(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LoginPageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut context = Context::new();
    context.insert("site_name", &state.config.site_name);
    context.insert("redirect", &safe_redirect_target(query.redirect.as_deref()));
    render(&state, ADMIN_LOGIN_PAGE, &context)
}

pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    AuthAdmin(admin): AuthAdmin,
) -> Result<impl IntoResponse, AppError> {
    let mut context = Context::new();
    context.insert("site_name", &state.config.site_name);
    context.insert("admin_email", &admin.email);
    render(&state, ADMIN_DASHBOARD_PAGE, &context)
}

fn render(state: &AppState, template: &str, context: &Context) -> Result<Html<String>, AppError> {
    state.templates.render(template, context)
        .map(Html)
        .map_err(|e| AppError::InternalWithMsg(format!("Template {} failed: {:?}", template, e)))
}
