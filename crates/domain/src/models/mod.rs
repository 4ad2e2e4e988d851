//! Domain models for Event Suite.

pub mod daily_preference;
pub mod event;
pub mod host_assignment;
pub mod participant;
pub mod registration;
pub mod summary;
pub mod user;
pub mod vehicle_share;

pub use daily_preference::DailyPreference;
pub use event::{Event, EventDay};
pub use host_assignment::HostAssignment;
pub use participant::ParticipantSchedule;
pub use registration::Registration;
pub use summary::EventSummary;
pub use user::User;
pub use vehicle_share::VehicleShare;
