use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::error::AppError;
use crate::state::AppState;
use crate::domain::ports::{
    AdminRepository, AdminSessionRepository, ChangeFeed, EmailService, GroupLockRepository,
    GuestRepository, RsvpRepository,
};
use crate::domain::services::{
    admin_sessions::AdminSessions,
    notification::{load_templates, DispatcherSettings, NotificationDispatcher},
    party::PartyResolver,
    rsvp_service::{RsvpService, RsvpSettings},
};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::events::memory_change_feed::MemoryChangeFeed;
use crate::infra::repositories::{
    postgres_admin_repo::PostgresAdminRepo, postgres_admin_session_repo::PostgresAdminSessionRepo,
    postgres_group_lock_repo::PostgresGroupLockRepo, postgres_guest_repo::PostgresGuestRepo,
    postgres_rsvp_repo::PostgresRsvpRepo,
    sqlite_admin_repo::SqliteAdminRepo, sqlite_admin_session_repo::SqliteAdminSessionRepo,
    sqlite_group_lock_repo::SqliteGroupLockRepo, sqlite_guest_repo::SqliteGuestRepo,
    sqlite_rsvp_repo::SqliteRsvpRepo,
};

/// Store-backed ports, one set per backend.
pub struct Repositories {
    pub guest_repo: Arc<dyn GuestRepository>,
    pub rsvp_repo: Arc<dyn RsvpRepository>,
    pub lock_repo: Arc<dyn GroupLockRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub session_repo: Arc<dyn AdminSessionRepository>,
}

impl Repositories {
    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            guest_repo: Arc::new(SqliteGuestRepo::new(pool.clone())),
            rsvp_repo: Arc::new(SqliteRsvpRepo::new(pool.clone())),
            lock_repo: Arc::new(SqliteGroupLockRepo::new(pool.clone())),
            admin_repo: Arc::new(SqliteAdminRepo::new(pool.clone())),
            session_repo: Arc::new(SqliteAdminSessionRepo::new(pool)),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            guest_repo: Arc::new(PostgresGuestRepo::new(pool.clone())),
            rsvp_repo: Arc::new(PostgresRsvpRepo::new(pool.clone())),
            lock_repo: Arc::new(PostgresGroupLockRepo::new(pool.clone())),
            admin_repo: Arc::new(PostgresAdminRepo::new(pool.clone())),
            session_repo: Arc::new(PostgresAdminSessionRepo::new(pool)),
        }
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let email_service = Arc::new(
        HttpEmailService::new(
            config.mail_service_url.clone(),
            config.mail_service_token.clone(),
            config.email_timeout,
        )
        .expect("Failed to build email client"),
    );

    let templates = Arc::new(load_templates().expect("Failed to load templates"));

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(config.store_timeout)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        Repositories::postgres(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        Repositories::sqlite(pool)
    };

    assemble_state(config, repos, email_service, Arc::new(MemoryChangeFeed::new()), templates)
        .expect("Failed to assemble application state")
}

/// Wires the services on top of already constructed ports.
pub fn assemble_state(
    config: &Config,
    repos: Repositories,
    email_service: Arc<dyn EmailService>,
    change_feed: Arc<dyn ChangeFeed>,
    templates: Arc<Tera>,
) -> Result<AppState, AppError> {
    let sessions = Arc::new(AdminSessions::new(repos.session_repo.clone(), config)?);

    let dispatcher = NotificationDispatcher::new(
        email_service,
        templates.clone(),
        DispatcherSettings {
            from: config.from_email.clone(),
            admin_list: config.admin_emails.clone(),
            site_name: config.site_name.clone(),
            couple_names: config.couple_names.clone(),
            timeout: config.email_timeout,
        },
    );

    let resolver = PartyResolver::new(repos.guest_repo.clone(), repos.rsvp_repo.clone(), config.store_timeout);

    let rsvp_service = Arc::new(RsvpService::new(
        resolver,
        repos.rsvp_repo.clone(),
        repos.lock_repo.clone(),
        change_feed.clone(),
        dispatcher,
        RsvpSettings {
            policy: config.guest_count_policy,
            lock_groups: config.lock_groups,
            store_timeout: config.store_timeout,
        },
    ));

    Ok(AppState {
        config: config.clone(),
        guest_repo: repos.guest_repo,
        rsvp_repo: repos.rsvp_repo,
        lock_repo: repos.lock_repo,
        admin_repo: repos.admin_repo,
        session_repo: repos.session_repo,
        sessions,
        change_feed,
        rsvp_service,
        templates,
    })
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
