pub mod admin;
pub mod auth;
pub mod change;
pub mod group_lock;
pub mod guest;
pub mod rsvp;
