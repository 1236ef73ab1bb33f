use std::sync::Arc;
use crate::domain::ports::{
    AdminRepository, AdminSessionRepository, ChangeFeed, GroupLockRepository,
    GuestRepository, RsvpRepository,
};
use crate::domain::services::{admin_sessions::AdminSessions, rsvp_service::RsvpService};
use crate::config::Config;
use tera::Tera;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub guest_repo: Arc<dyn GuestRepository>,
    pub rsvp_repo: Arc<dyn RsvpRepository>,
    pub lock_repo: Arc<dyn GroupLockRepository>,
    pub admin_repo: Arc<dyn AdminRepository>,
    pub session_repo: Arc<dyn AdminSessionRepository>,
    pub sessions: Arc<AdminSessions>,
    pub change_feed: Arc<dyn ChangeFeed>,
    pub rsvp_service: Arc<RsvpService>,
    pub templates: Arc<Tera>,
}
