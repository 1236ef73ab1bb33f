pub mod email;
pub mod events;
pub mod factory;
pub mod repositories;
