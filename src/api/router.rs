use axum::{
    body::Body,
    extract::Request,
    middleware,
    routing::{get, post, patch, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{admin, auth, health, pages, rsvp};
use crate::api::middleware::admin_guard;
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Everything under /admin except the login page.
    let admin_area = Router::new()
        .route("/admin", get(pages::dashboard_page))
        .route("/admin/api/rsvps", get(admin::list_rsvps))
        .route("/admin/api/rsvps/{id}", patch(admin::update_rsvp).delete(admin::delete_rsvp))
        .route("/admin/api/groups", get(admin::list_groups))
        .route("/admin/api/stats", get(admin::get_stats))
        .route("/admin/api/locks/{group_id}", delete(admin::release_lock))
        .route("/admin/api/changes", get(admin::stream_changes))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/qr", get(health::qr_redirect))

        // Public RSVP flow
        .route("/api/rsvp", post(rsvp::submit_rsvp))
        .route("/api/rsvp/party", get(rsvp::get_party))

        // Auth
        .route("/api/auth/sign-in", post(auth::sign_in))
        .route("/api/auth/sign-out", post(auth::sign_out))
        .route("/api/auth/me", get(auth::me))

        // Admin
        .route("/admin/login", get(pages::login_page))
        .merge(admin_area)

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        admin_id = tracing::field::Empty,
                        group_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
