use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    /// A write on the submission path failed; the message is safe to show the guest.
    #[error("Save failed: {0}")]
    SaveFailed(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

impl AppError {
    /// True for unique-constraint violations (SQLite 2067, PostgreSQL 23505).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(e) => e
                .as_database_error()
                .and_then(|db_err| db_err.code())
                .map(|code| code == "2067" || code == "23505")
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Shown when the store gave no message of its own.
pub const SAVE_FAILED_FALLBACK: &str = "We could not save your RSVP. Please try again.";

impl AppError {
    /// Turns a store failure during a submission into something the guest can read.
    /// Timeouts and already user-facing errors pass through unchanged.
    pub fn into_save_failure(self) -> AppError {
        match self {
            AppError::Database(e) => {
                error!("RSVP write failed: {:?}", e);
                let message = e
                    .as_database_error()
                    .map(|db_err| db_err.message().to_string())
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| SAVE_FAILED_FALLBACK.to_string());
                AppError::SaveFailed(message)
            }
            AppError::InternalWithMsg(msg) => {
                error!("RSVP write failed: {}", msg);
                AppError::SaveFailed(SAVE_FAILED_FALLBACK.to_string())
            }
            AppError::Internal => AppError::SaveFailed(SAVE_FAILED_FALLBACK.to_string()),
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if self.is_unique_violation() {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "ok": false, "error": "Resource already exists (duplicate entry)" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::SaveFailed(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Timeout(what) => {
                error!("Timed out waiting for {}", what);
                (StatusCode::GATEWAY_TIMEOUT, format!("Timed out waiting for {}", what))
            }
            AppError::Upstream(msg) => {
                error!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, msg.clone())
            }
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };

        let body = Json(json!({
            "ok": false,
            "error": message
        }));

        (status, body).into_response()
    }
}
