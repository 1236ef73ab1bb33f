pub mod sqlite_guest_repo;
pub mod sqlite_rsvp_repo;
pub mod sqlite_group_lock_repo;
pub mod sqlite_admin_repo;
pub mod sqlite_admin_session_repo;

pub mod postgres_guest_repo;
pub mod postgres_rsvp_repo;
pub mod postgres_group_lock_repo;
pub mod postgres_admin_repo;
pub mod postgres_admin_session_repo;
