//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod daily_preference;
pub mod event;
pub mod host_assignment;
pub mod registration;
pub mod user;
pub mod vehicle_share;

pub use daily_preference::{DailyPreferenceEntity, UpsertedPreferenceEntity};
pub use event::{EventDayEntity, EventEntity};
pub use host_assignment::HostAssignmentEntity;
pub use registration::RegistrationEntity;
pub use user::UserEntity;
pub use vehicle_share::VehicleShareEntity;
