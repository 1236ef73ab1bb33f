pub mod admin_accounts;
pub mod admin_sessions;
pub mod dashboard;
pub mod deadline;
pub mod names;
pub mod notification;
pub mod party;
pub mod rsvp_service;
pub mod selection;
