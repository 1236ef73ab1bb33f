pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;

use std::env;
use std::io;
use std::sync::Arc;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::api::router::create_router;
use crate::config::Config;
use crate::infra::factory::bootstrap_state;

const DEFAULT_LOG_DIR: &str = "./logs";

/// Compact console output filtered by `RUST_LOG`, plus daily JSON files under `LOG_DIR`
/// that keep the request span fields (`request_id`, `admin_id`, `group_id`) on every line.
pub fn init_logging() -> WorkerGuard {
    let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| DEFAULT_LOG_DIR.to_string());
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&log_dir, "wedding-rsvp.log"));

    let file_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(writer)
        .with_filter(EnvFilter::new("info,wedding_rsvp=debug,sqlx=warn"));

    let console_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("JSON logs go to {}", log_dir);
    guard
}

/// Serves until Ctrl+C or SIGTERM. Bad configuration panics during startup.
pub async fn run() -> io::Result<()> {
    let _guard = init_logging();

    let config = Config::from_env();
    let state = Arc::new(bootstrap_state(&config).await);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("RSVP service for {} listening on port {}", config.couple_names, config.port);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("RSVP service stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Ctrl+C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("SIGTERM handler unavailable: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => info!("Interrupted, draining connections"),
        _ = terminate => info!("Terminated, draining connections"),
    }
}
