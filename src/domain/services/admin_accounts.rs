use std::sync::Arc;
use argon2::{password_hash::{SaltString, PasswordHash, PasswordHasher, PasswordVerifier}, Argon2};
use rand::rngs::OsRng;
use tracing::info;

use crate::domain::models::admin::Admin;
use crate::domain::ports::{AdminRepository, AdminSessionRepository};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountChange {
    Created,
    PasswordUpdated,
}

/// Creates the admin, or resets the password of the one already registered under `email`.
/// A reset closes every open session of that admin.
pub async fn ensure_admin(
    admins: &Arc<dyn AdminRepository>,
    sessions: &Arc<dyn AdminSessionRepository>,
    email: &str,
    password: &str,
) -> Result<(Admin, AccountChange), AppError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(AppError::Validation("Missing admin email or password".into()));
    }

    let password_hash = hash_password(password)?;

    match admins.find_by_email(email).await? {
        Some(existing) => {
            let admin = admins.update_password(&existing.id, &password_hash).await?;
            let closed = sessions.revoke_all_for(&admin.id).await?;
            info!("Updated password for {} and closed {} sessions", admin.email, closed);
            Ok((admin, AccountChange::PasswordUpdated))
        }
        None => {
            let admin = admins.create(&Admin::new(email.to_string(), password_hash)).await?;
            info!("Created admin {}", admin.email);
            Ok((admin, AccountChange::Created))
        }
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalWithMsg(format!("Password hashing failed: {}", e)))
}

/// `Ok(false)` is a wrong password. An unreadable stored hash is a server fault.
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| AppError::InternalWithMsg(format!("Stored password hash is unreadable: {}", e)))?;
    Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}
