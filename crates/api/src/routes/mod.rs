//! HTTP route handlers.

pub mod daily_preferences;
pub mod events;
pub mod health;
pub mod host_assignments;
pub mod openapi;
pub mod registrations;
pub mod users;
pub mod vehicle_shares;
