//! Admin sign-in, current-admin lookup and sign-out.
//!
//! The browser holds a short EdDSA-signed token in an HttpOnly cookie. Every token names
//! a row in `admin_sessions`; deleting that row is what signing out means.

use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::{distributions::Alphanumeric, Rng};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::models::{admin::Admin, auth::{AdminSessionRecord, Claims}};
use crate::domain::ports::AdminSessionRepository;
use crate::error::AppError;

pub const TOKEN_AUDIENCE: &str = "wedding-admin";

/// What the sign-in handler hands to the browser.
#[derive(Debug)]
pub struct SignedIn {
    pub access_token: String,
    pub csrf_token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct AdminSessions {
    repo: Arc<dyn AdminSessionRepository>,
    issuer: String,
    ttl: TimeDelta,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AdminSessions {
    pub fn new(repo: Arc<dyn AdminSessionRepository>, config: &Config) -> Result<Self, AppError> {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid JWT private key: {}", e)))?;
        let decoding_key = DecodingKey::from_ed_pem(config.jwt_public_key.as_bytes())
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid JWT public key: {}", e)))?;
        let ttl = TimeDelta::from_std(config.session_ttl)
            .map_err(|e| AppError::InternalWithMsg(format!("Invalid session lifetime: {}", e)))?;

        Ok(Self {
            repo,
            issuer: config.auth_issuer.clone(),
            ttl,
            encoding_key,
            decoding_key,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or_default()
    }

    /// Opens a session for an admin whose password was already checked.
    pub async fn sign_in(&self, admin: &Admin) -> Result<SignedIn, AppError> {
        match self.repo.purge_expired().await {
            Ok(0) => {}
            Ok(n) => debug!("Purged {} expired admin sessions", n),
            Err(e) => warn!("Could not purge expired admin sessions: {}", e),
        }

        let session = AdminSessionRecord::open(&admin.id, self.ttl);
        self.repo.create(&session).await?;

        let csrf_token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect();
        let claims = Claims {
            iss: self.issuer.clone(),
            aud: TOKEN_AUDIENCE.to_string(),
            sub: admin.id.clone(),
            sid: session.id.clone(),
            exp: session.expires_at.timestamp() as usize,
            iat: session.created_at.timestamp() as usize,
            email: admin.email.clone(),
            role: admin.role.clone(),
            csrf_token: csrf_token.clone(),
        };

        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalWithMsg(format!("Signing admin token failed: {}", e)))?;

        info!("Session {} opened for admin {}", session.id, admin.id);
        Ok(SignedIn { access_token, csrf_token, expires_at: session.expires_at })
    }

    /// Valid signature, audience and issuer, and a session row that is still open.
    pub async fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.set_audience(&[TOKEN_AUDIENCE]);
        validation.set_issuer(&[self.issuer.as_str()]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!("Rejected admin token: {}", e);
                AppError::Unauthorized
            })?;

        match self.repo.find_active(&claims.sid).await? {
            Some(session) if session.admin_id == claims.sub => Ok(claims),
            _ => {
                debug!("Session {} is closed or belongs to someone else", claims.sid);
                Err(AppError::Unauthorized)
            }
        }
    }

    pub async fn sign_out(&self, session_id: &str) -> Result<bool, AppError> {
        let closed = self.repo.revoke(session_id).await?;
        if closed {
            info!("Session {} closed", session_id);
        }
        Ok(closed)
    }
}
