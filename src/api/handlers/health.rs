use axum::response::{IntoResponse, Redirect};

pub async fn health_check() -> &'static str {
    "OK"
}

/// Target of the printed QR code. Permanent, so it can be repointed without reprinting.
pub async fn qr_redirect() -> impl IntoResponse {
    Redirect::permanent("/")
}
