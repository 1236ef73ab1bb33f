use crate::domain::models::{
    admin::Admin, auth::AdminSessionRecord, change::ChangeEvent,
    group_lock::LockOutcome, guest::Guest, rsvp::Rsvp,
};
use crate::error::AppError;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

#[async_trait]
pub trait GuestRepository: Send + Sync {
    /// Case-insensitive exact match on both names.
    async fn find_by_name(&self, first_name: &str, last_name: &str) -> Result<Option<Guest>, AppError>;
    /// Members of one party, ordered by last name then first name.
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Guest>, AppError>;
}

/// Result of `RsvpRepository::save_submission`.
#[derive(Debug, Clone)]
pub struct SavedSubmission {
    /// The submitter's row as stored by this write. A duplicate keeps the earlier id.
    pub record: Rsvp,
    pub duplicate: bool,
    pub party: Vec<Rsvp>,
}

#[async_trait]
pub trait RsvpRepository: Send + Sync {
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<Rsvp>, AppError>;
    /// Stores one submission atomically: the submitter's detail row plus the party rows.
    /// When the same person already answered for the group, their row keeps its id, takes
    /// the new answer and is reported as a duplicate. Nothing is written when any
    /// statement fails.
    async fn save_submission(&self, detail: &Rsvp, party: &[Rsvp]) -> Result<SavedSubmission, AppError>;
    /// Batch upsert on `(first_name, last_name, group_id)`. Existing rows keep their id and
    /// contact details; only attendance and headcount change.
    async fn upsert_party(&self, rows: &[Rsvp]) -> Result<Vec<Rsvp>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Rsvp>, AppError>;
    /// Newest first.
    async fn list_all(&self) -> Result<Vec<Rsvp>, AppError>;
    async fn update_attending(&self, id: &str, attending: bool) -> Result<Rsvp, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait GroupLockRepository: Send + Sync {
    /// Single conditional insert; a lock that already exists is reported, not raised.
    async fn try_lock(&self, group_id: &str) -> Result<LockOutcome, AppError>;
    async fn is_locked(&self, group_id: &str) -> Result<bool, AppError>;
    async fn release(&self, group_id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: &Admin) -> Result<Admin, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, AppError>;
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<Admin, AppError>;
}

#[async_trait]
pub trait AdminSessionRepository: Send + Sync {
    async fn create(&self, session: &AdminSessionRecord) -> Result<(), AppError>;
    /// Sessions past `expires_at` are never returned.
    async fn find_active(&self, id: &str) -> Result<Option<AdminSessionRecord>, AppError>;
    async fn revoke(&self, id: &str) -> Result<bool, AppError>;
    /// Ends every session of one admin, e.g. after a password reset.
    async fn revoke_all_for(&self, admin_id: &str) -> Result<u64, AppError>;
    async fn purge_expired(&self) -> Result<u64, AppError>;
}

/// Message id assigned by the provider.
pub type MessageId = String;

#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<MessageId, AppError>;
}

pub type ChangeStream = Pin<Box<dyn Stream<Item = ChangeEvent> + Send>>;

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    async fn publish(&self, event: ChangeEvent) -> Result<(), AppError>;
    async fn subscribe(&self, table: &str) -> Result<ChangeStream, AppError>;
}
