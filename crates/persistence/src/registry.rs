//! Wiring of repository implementations into domain services.

use std::sync::Arc;

use sqlx::PgPool;

use domain::repositories::memory::InMemoryStore;
use domain::repositories::{
    DailyPreferenceRepository, EventRepository, HealthCheckRepository, HostAssignmentRepository,
    RegistrationRepository, UserRepository, VehicleShareRepository,
};
use domain::services::{
    DailyPreferenceStore, EventDashboard, EventRegistry, HostAssignments, ParticipantLookup,
    RegistrationManager, UserDirectory, VehicleSharingCoordinator,
};

use crate::repositories::{
    DailyPreferenceRepositoryImpl, EventRepositoryImpl, HealthCheckRepositoryImpl,
    HostAssignmentRepositoryImpl, RegistrationRepositoryImpl, UserRepositoryImpl,
    VehicleShareRepositoryImpl,
};

/// The set of repositories for one storage backend.
#[derive(Clone)]
pub struct AppRegistry {
    health_check_repository: Arc<dyn HealthCheckRepository>,
    user_repository: Arc<dyn UserRepository>,
    event_repository: Arc<dyn EventRepository>,
    registration_repository: Arc<dyn RegistrationRepository>,
    host_assignment_repository: Arc<dyn HostAssignmentRepository>,
    vehicle_share_repository: Arc<dyn VehicleShareRepository>,
    daily_preference_repository: Arc<dyn DailyPreferenceRepository>,
}

impl AppRegistry {
    /// Repositories backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            health_check_repository: Arc::new(HealthCheckRepositoryImpl::new(pool.clone())),
            user_repository: Arc::new(UserRepositoryImpl::new(pool.clone())),
            event_repository: Arc::new(EventRepositoryImpl::new(pool.clone())),
            registration_repository: Arc::new(RegistrationRepositoryImpl::new(pool.clone())),
            host_assignment_repository: Arc::new(HostAssignmentRepositoryImpl::new(pool.clone())),
            vehicle_share_repository: Arc::new(VehicleShareRepositoryImpl::new(pool.clone())),
            daily_preference_repository: Arc::new(DailyPreferenceRepositoryImpl::new(pool)),
        }
    }

    /// Repositories sharing one in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            health_check_repository: store.clone(),
            user_repository: store.clone(),
            event_repository: store.clone(),
            registration_repository: store.clone(),
            host_assignment_repository: store.clone(),
            vehicle_share_repository: store.clone(),
            daily_preference_repository: store,
        }
    }

    pub fn health_check_repository(&self) -> Arc<dyn HealthCheckRepository> {
        self.health_check_repository.clone()
    }

    pub fn user_directory(&self) -> UserDirectory {
        UserDirectory::new(self.user_repository.clone())
    }

    pub fn event_registry(&self) -> EventRegistry {
        EventRegistry::new(self.event_repository.clone())
    }

    pub fn registration_manager(&self) -> RegistrationManager {
        RegistrationManager::new(
            self.event_repository.clone(),
            self.user_repository.clone(),
            self.registration_repository.clone(),
        )
    }

    pub fn host_assignments(&self) -> HostAssignments {
        HostAssignments::new(
            self.event_repository.clone(),
            self.user_repository.clone(),
            self.host_assignment_repository.clone(),
        )
    }

    pub fn vehicle_sharing(&self) -> VehicleSharingCoordinator {
        VehicleSharingCoordinator::new(
            self.event_repository.clone(),
            self.user_repository.clone(),
            self.vehicle_share_repository.clone(),
        )
    }

    pub fn daily_preferences(&self) -> DailyPreferenceStore {
        DailyPreferenceStore::new(
            self.user_repository.clone(),
            self.daily_preference_repository.clone(),
        )
    }

    pub fn participant_lookup(&self) -> ParticipantLookup {
        ParticipantLookup::new(
            self.event_repository.clone(),
            self.user_repository.clone(),
            self.registration_repository.clone(),
            self.daily_preference_repository.clone(),
        )
    }

    pub fn dashboard(&self) -> EventDashboard {
        EventDashboard::new(
            self.event_repository.clone(),
            self.registration_repository.clone(),
            self.host_assignment_repository.clone(),
            self.vehicle_share_repository.clone(),
            self.daily_preference_repository.clone(),
        )
    }
}
