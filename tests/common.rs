#![allow(dead_code)]

use wedding_rsvp::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{admin::Admin, rsvp::{GuestCountPolicy, Rsvp}},
    domain::models::guest::Guest,
    domain::ports::{EmailService, GuestRepository, MessageId, OutgoingEmail},
    domain::services::{admin_accounts::ensure_admin, notification::load_templates},
    infra::events::memory_change_feed::MemoryChangeFeed,
    infra::factory::{assemble_state, Repositories},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    Router,
};
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::Value;

pub const ADMIN_EMAIL: &str = "couple@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

pub struct MockEmailService;

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, _email: &OutgoingEmail) -> Result<MessageId, AppError> {
        Ok(format!("mock-{}", Uuid::new_v4()))
    }
}

pub struct FailingEmailService;

#[async_trait]
impl EmailService for FailingEmailService {
    async fn send(&self, _email: &OutgoingEmail) -> Result<MessageId, AppError> {
        Err(AppError::Upstream("Email service failed. Status: 500".into()))
    }
}

/// Keeps every message; fails only those whose subject starts with `fail_prefix`.
#[derive(Default)]
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail_prefix: Option<String>,
}

impl RecordingEmailService {
    pub fn failing_on(prefix: &str) -> Self {
        Self { sent: Mutex::new(Vec::new()), fail_prefix: Some(prefix.to_string()) }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(&self, email: &OutgoingEmail) -> Result<MessageId, AppError> {
        if let Some(prefix) = &self.fail_prefix
            && email.subject.starts_with(prefix.as_str()) {
            return Err(AppError::Upstream(format!("rejected: {}", email.subject)));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(format!("rec-{}", sent.len()))
    }
}

/// Every lookup fails like an unreachable store.
pub struct FailingGuestRepo;

#[async_trait]
impl GuestRepository for FailingGuestRepo {
    async fn find_by_name(&self, _first_name: &str, _last_name: &str) -> Result<Option<Guest>, AppError> {
        Err(AppError::InternalWithMsg("guest store unreachable".into()))
    }

    async fn list_by_group(&self, _group_id: &str) -> Result<Vec<Guest>, AppError> {
        Err(AppError::InternalWithMsg("guest store unreachable".into()))
    }
}

/// Answers nothing until `delay` has passed.
pub struct SlowGuestRepo {
    pub delay: Duration,
}

#[async_trait]
impl GuestRepository for SlowGuestRepo {
    async fn find_by_name(&self, _first_name: &str, _last_name: &str) -> Result<Option<Guest>, AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn list_by_group(&self, _group_id: &str) -> Result<Vec<Guest>, AppError> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }
}

pub struct AuthHeaders {
    pub session_token: String,
    pub csrf_token: String,
}

impl AuthHeaders {
    pub fn cookie(&self) -> String {
        format!("admin_session={}", self.session_token)
    }
}

pub struct TestOptions {
    pub admin_emails: Vec<String>,
    pub lock_groups: bool,
    pub policy: GuestCountPolicy,
    pub email_service: Arc<dyn EmailService>,
    /// Replaces the sqlite guest list.
    pub guest_repo: Option<Arc<dyn GuestRepository>>,
    pub store_timeout: Duration,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            admin_emails: vec![ADMIN_EMAIL.to_string()],
            lock_groups: true,
            policy: GuestCountPolicy::default(),
            email_service: Arc::new(MockEmailService),
            guest_repo: None,
            store_timeout: Duration::from_secs(5),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(TestOptions::default()).await
    }

    pub async fn with_email(email_service: Arc<dyn EmailService>) -> Self {
        Self::with_options(TestOptions { email_service, ..TestOptions::default() }).await
    }

    pub async fn with_options(options: TestOptions) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            from_email: "Weddings <noreply@example.com>".to_string(),
            admin_emails: options.admin_emails,
            site_name: "Our Wedding".to_string(),
            couple_names: "Ada & Charles".to_string(),
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            guest_count_policy: options.policy,
            lock_groups: options.lock_groups,
            store_timeout: options.store_timeout,
            email_timeout: Duration::from_secs(5),
            venue_capacity: 10,
            session_ttl: Duration::from_secs(60 * 60),
        };

        let mut repos = Repositories::sqlite(pool.clone());
        if let Some(guest_repo) = options.guest_repo {
            repos.guest_repo = guest_repo;
        }

        let state = Arc::new(assemble_state(
            &config,
            repos,
            options.email_service,
            Arc::new(MemoryChangeFeed::new()),
            Arc::new(load_templates().expect("templates")),
        ).expect("Failed to assemble test state"));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn seed_guest(&self, first_name: &str, last_name: &str, group_id: Option<&str>) {
        sqlx::query("INSERT INTO guests (id, first_name, last_name, group_id, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(first_name)
            .bind(last_name)
            .bind(group_id)
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
            .expect("Failed to seed guest");
    }

    pub async fn rsvps_in_group(&self, group_id: &str) -> Vec<Rsvp> {
        self.state.rsvp_repo.list_by_group(group_id).await.unwrap()
    }

    pub async fn rsvp_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM rsvps")
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn create_admin(&self, email: &str, password: &str) -> Admin {
        ensure_admin(&self.state.admin_repo, &self.state.session_repo, email, password).await.unwrap().0
    }

    pub async fn post_json(&self, uri: &str, payload: &Value) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap()
    }

    pub async fn post_raw(&self, uri: &str, body: &'static str) -> axum::response::Response {
        self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        ).await.unwrap()
    }

    pub async fn get(&self, uri: &str, auth: Option<&AuthHeaders>) -> axum::response::Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(auth) = auth {
            builder = builder.header(header::COOKIE, auth.cookie());
        }
        self.router.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    pub async fn login(&self, email: &str, password: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "email": email,
            "password": password
        });

        let response = self.post_json("/api/auth/sign-in", &payload).await;

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let session_cookie = cookies.iter()
            .find(|c| c.starts_with("admin_session="))
            .expect("No admin_session cookie returned");

        let value = &session_cookie["admin_session=".len()..];
        let session_token = value.split(';').next().unwrap().to_string();

        let body_json = parse_body(response).await;
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            session_token,
            csrf_token
        }
    }

    /// Registers the default admin and signs in.
    pub async fn admin_session(&self) -> AuthHeaders {
        self.create_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
