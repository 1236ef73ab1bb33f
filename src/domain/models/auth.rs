use serde::{Deserialize, Serialize};
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Access-token payload. `sid` points at the server-side session row, so signing out
/// invalidates the cookie before it expires.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub sid: String,
    pub exp: usize,
    pub iat: usize,
    pub email: String,
    pub role: String,
    #[serde(rename = "csrf")]
    pub csrf_token: String,
}

/// One signed-in browser of an admin.
#[derive(Debug, Clone, FromRow)]
pub struct AdminSessionRecord {
    pub id: String,
    pub admin_id: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl AdminSessionRecord {
    pub fn open(admin_id: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            admin_id: admin_id.to_string(),
            expires_at: now + ttl,
            created_at: now,
        }
    }
}

#[derive(Serialize)]
pub struct SignInResponse {
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
    pub admin: AdminProfile,
}

#[derive(Serialize)]
pub struct AdminProfile {
    pub id: String,
    pub email: String,
    pub role: String,
}
