//! PostgreSQL implementations of the domain repository traits.

pub mod daily_preference;
pub mod event;
pub mod health;
pub mod host_assignment;
pub mod registration;
pub mod user;
pub mod vehicle_share;

pub use daily_preference::DailyPreferenceRepositoryImpl;
pub use event::EventRepositoryImpl;
pub use health::HealthCheckRepositoryImpl;
pub use host_assignment::HostAssignmentRepositoryImpl;
pub use registration::RegistrationRepositoryImpl;
pub use user::UserRepositoryImpl;
pub use vehicle_share::VehicleShareRepositoryImpl;
