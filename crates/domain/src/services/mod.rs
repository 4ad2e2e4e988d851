//! Domain services for Event Suite.
//!
//! Services contain the business rules and talk to storage only through
//! the repository traits.

pub mod daily_preferences;
pub mod dashboard;
pub mod event_registry;
pub mod host_assignments;
pub mod participant_lookup;
pub mod registration_manager;
pub mod user_directory;
pub mod vehicle_sharing;

pub use daily_preferences::DailyPreferenceStore;
pub use dashboard::EventDashboard;
pub use event_registry::EventRegistry;
pub use host_assignments::HostAssignments;
pub use participant_lookup::ParticipantLookup;
pub use registration_manager::RegistrationManager;
pub use user_directory::UserDirectory;
pub use vehicle_sharing::VehicleSharingCoordinator;
