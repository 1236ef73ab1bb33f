use std::env;
use std::time::Duration;
use tracing::warn;

use crate::domain::models::rsvp::GuestCountPolicy;

const FALLBACK_DATABASE_URL: &str = "sqlite://wedding.db?mode=rwc";

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub from_email: String,
    pub admin_emails: Vec<String>,
    pub site_name: String,
    pub couple_names: String,
    pub jwt_secret_key: String, // Private key (PEM)
    pub jwt_public_key: String, // Public key (PEM)
    pub auth_issuer: String,
    pub guest_count_policy: GuestCountPolicy,
    pub lock_groups: bool,
    pub store_timeout: Duration,
    pub email_timeout: Duration,
    pub venue_capacity: i64,
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            warn!("DATABASE_URL is not set! Falling back to local store {}", FALLBACK_DATABASE_URL);
            FALLBACK_DATABASE_URL.to_string()
        });

        let mail_service_token = env::var("RESEND_API_KEY").unwrap_or_else(|_| {
            warn!("RESEND_API_KEY is not set, outgoing mail will be rejected by the provider");
            String::new()
        });

        Self {
            database_url,
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "https://api.resend.com/emails".to_string()),
            mail_service_token,
            from_email: env::var("FROM_EMAIL").unwrap_or_else(|_| "Weddings <onboarding@resend.dev>".to_string()),
            admin_emails: parse_address_list(&env::var("ADMIN_EMAIL").unwrap_or_default()),
            site_name: env::var("SITE_NAME").unwrap_or_else(|_| "Our Wedding".to_string()),
            couple_names: env::var("COUPLE_NAMES").unwrap_or_else(|_| "The Couple".to_string()),
            jwt_secret_key: env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set (Ed25519 Private Key)"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.wedding-rsvp.local".to_string()),
            guest_count_policy: env::var("GUEST_COUNT_POLICY")
                .ok()
                .map(|v| v.parse().expect("GUEST_COUNT_POLICY must be 'per_attendee' or 'declared'"))
                .unwrap_or_default(),
            lock_groups: env::var("LOCK_GROUPS").map(|v| parse_flag(&v)).unwrap_or(true),
            store_timeout: Duration::from_millis(millis_var("STORE_TIMEOUT_MS", 5000)),
            email_timeout: Duration::from_millis(millis_var("EMAIL_TIMEOUT_MS", 5000)),
            venue_capacity: env::var("VENUE_CAPACITY").unwrap_or_else(|_| "200".to_string()).parse().expect("VENUE_CAPACITY must be a number"),
            session_ttl: Duration::from_secs(60 * 60 * env::var("SESSION_HOURS").unwrap_or_else(|_| "12".to_string()).parse::<u64>().expect("SESSION_HOURS must be a number")),
        }
    }

    /// Allowlist check for the admin area. An empty list lets every signed-in admin through.
    pub fn is_admin_allowed(&self, email: &str) -> bool {
        if self.admin_emails.is_empty() {
            return true;
        }
        let email = email.trim().to_lowercase();
        self.admin_emails.iter().any(|a| a.to_lowercase() == email)
    }
}

pub fn parse_address_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_flag(raw: &str) -> bool {
    !matches!(raw.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off")
}

/// Unset means `default`. A value that is set but malformed stops startup, like every other setting.
fn millis_var(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(v) => parse_millis(key, &v),
        Err(_) => default,
    }
}

fn parse_millis(key: &str, raw: &str) -> u64 {
    raw.trim().parse().unwrap_or_else(|_| panic!("{} must be a number of milliseconds, got '{}'", key, raw))
}
