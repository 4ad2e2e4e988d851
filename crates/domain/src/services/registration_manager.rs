//! Registration manager: admission, status changes and cancellation.

use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::registration::{
    CreateRegistrationRequest, NewRegistration, Registration, RegistrationStatus,
};
use crate::repositories::{EventRepository, RegistrationRepository, UserRepository};

pub struct RegistrationManager {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    registrations: Arc<dyn RegistrationRepository>,
}

impl RegistrationManager {
    pub fn new(
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        registrations: Arc<dyn RegistrationRepository>,
    ) -> Self {
        Self {
            events,
            users,
            registrations,
        }
    }

    /// Registers a user for an event.
    ///
    /// The event must be active and open for registration. When the seats do
    /// not fit, the registration is wait-listed if requested, otherwise
    /// refused with a capacity error.
    pub async fn register(
        &self,
        event_id: Uuid,
        request: CreateRegistrationRequest,
    ) -> DomainResult<Registration> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;
        event.ensure_open_for_registration(Utc::now().date_naive())?;

        if self.users.find_by_id(request.user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }

        let registration = self
            .registrations
            .register(NewRegistration::new(event_id, request))
            .await?;

        counter!("registrations_created_total", "status" => registration.status.as_str())
            .increment(1);
        info!(
            registration_id = %registration.id,
            event_id = %event_id,
            user_id = %registration.user_id,
            status = registration.status.as_str(),
            members = registration.number_of_members,
            "Registration created"
        );
        Ok(registration)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Registration> {
        self.registrations
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Registration"))
    }

    pub async fn list(
        &self,
        event_id: Uuid,
        status: Option<RegistrationStatus>,
        page: PageRequest,
    ) -> DomainResult<Paginated<Registration>> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(DomainError::not_found("Event"));
        }
        let (registrations, total) = self
            .registrations
            .list_by_event(event_id, status, page)
            .await?;
        Ok(Paginated::new(registrations, total, page))
    }

    /// Cancels a registration, freeing its seats and vehicle places.
    /// Cancelling twice is not an error.
    pub async fn cancel(&self, id: Uuid) -> DomainResult<Registration> {
        let registration = self
            .registrations
            .cancel(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Registration"))?;
        info!(
            registration_id = %id,
            event_id = %registration.event_id,
            "Registration cancelled"
        );
        Ok(registration)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> DomainResult<Registration> {
        if status == RegistrationStatus::Cancelled {
            return self.cancel(id).await;
        }
        let registration = self
            .registrations
            .update_status(id, status)
            .await?
            .ok_or_else(|| DomainError::not_found("Registration"))?;
        info!(
            registration_id = %id,
            status = status.as_str(),
            "Registration status updated"
        );
        Ok(registration)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::event::UpdateEventRequest;
    use crate::models::vehicle_share::CreateVehicleShareRequest;
    use crate::repositories::memory::InMemoryStore;
    use crate::repositories::RegistrationRepository;
    use crate::services::test_support::*;
    use crate::services::{EventRegistry, VehicleSharingCoordinator};

    fn manager(store: &Arc<InMemoryStore>) -> RegistrationManager {
        RegistrationManager::new(store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflict() {
        let store = store();
        let event = create_event(&store, None).await;
        let user = create_user(&store).await;
        let manager = manager(&store);

        manager
            .register(event.id, registration_request(user.id, 1))
            .await
            .unwrap();
        let result = manager
            .register(event.id, registration_request(user.id, 1))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_again_after_cancel() {
        let store = store();
        let event = create_event(&store, None).await;
        let user = create_user(&store).await;
        let manager = manager(&store);

        let first = manager
            .register(event.id, registration_request(user.id, 1))
            .await
            .unwrap();
        manager.cancel(first.id).await.unwrap();
        let second = manager
            .register(event.id, registration_request(user.id, 1))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_capacity_and_waitlist() {
        let store = store();
        let event = create_event(&store, Some(2)).await;
        let manager = manager(&store);
        let group_lead = create_user(&store).await;
        let late = create_user(&store).await;

        let group = manager
            .register(event.id, registration_request(group_lead.id, 2))
            .await
            .unwrap();
        assert_eq!(group.status, RegistrationStatus::Registered);

        let result = manager
            .register(event.id, registration_request(late.id, 1))
            .await;
        assert!(matches!(result, Err(DomainError::CapacityExceeded(_))));
        assert!(store.find_active(event.id, late.id).await.unwrap().is_none());

        let mut request = registration_request(late.id, 1);
        request.join_waitlist = true;
        let waiting = manager.register(event.id, request).await.unwrap();
        assert_eq!(waiting.status, RegistrationStatus::Waiting);

        let result = manager
            .update_status(waiting.id, RegistrationStatus::Registered)
            .await;
        assert!(matches!(result, Err(DomainError::CapacityExceeded(_))));

        manager.cancel(group.id).await.unwrap();
        let promoted = manager
            .update_status(waiting.id, RegistrationStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(promoted.status, RegistrationStatus::Confirmed);
        assert_eq!(store.stats(event.id).await.unwrap().seats_taken, 1);
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent_and_final() {
        let store = store();
        let event = create_event(&store, None).await;
        let user = create_user(&store).await;
        let manager = manager(&store);
        let registration = register(&store, &event, &user).await;

        let cancelled = manager.cancel(registration.id).await.unwrap();
        assert_eq!(cancelled.status, RegistrationStatus::Cancelled);
        let again = manager.cancel(registration.id).await.unwrap();
        assert_eq!(again.status, RegistrationStatus::Cancelled);

        let result = manager
            .update_status(registration.id, RegistrationStatus::Registered)
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_cancel_releases_vehicles() {
        let store = store();
        let event = create_event(&store, None).await;
        let driver = create_user(&store).await;
        let rider = create_user(&store).await;
        let manager = manager(&store);
        let driver_reg = register(&store, &event, &driver).await;
        let rider_reg = register(&store, &event, &rider).await;

        let coordinator =
            VehicleSharingCoordinator::new(store.clone(), store.clone(), store.clone());
        let share = coordinator
            .create_share(
                event.id,
                CreateVehicleShareRequest {
                    driver_user_id: driver.id,
                    capacity: 3,
                    notes: None,
                },
            )
            .await
            .unwrap();
        coordinator.join_share(share.id, rider.id).await.unwrap();

        manager.cancel(rider_reg.id).await.unwrap();
        assert!(coordinator.get(share.id).await.unwrap().passengers.is_empty());

        manager.cancel(driver_reg.id).await.unwrap();
        assert!(matches!(
            coordinator.get(share.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_register_closed_event() {
        let store = store();
        let event = create_event(&store, None).await;
        let user = create_user(&store).await;
        let manager = manager(&store);

        EventRegistry::new(store.clone())
            .update(
                event.id,
                UpdateEventRequest {
                    registration_start_date: Some(Some(Utc::now().date_naive() + Duration::days(7))),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let result = manager
            .register(event.id, registration_request(user.id, 1))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));

        EventRegistry::new(store.clone())
            .update(
                event.id,
                UpdateEventRequest {
                    registration_start_date: Some(None),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let result = manager
            .register(event.id, registration_request(user.id, 1))
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_unknown_event_or_user() {
        let store = store();
        let event = create_event(&store, None).await;
        let user = create_user(&store).await;
        let manager = manager(&store);

        let result = manager
            .register(Uuid::new_v4(), registration_request(user.id, 1))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
        let result = manager
            .register(event.id, registration_request(Uuid::new_v4(), 1))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_by_status() {
        let store = store();
        let event = create_event(&store, None).await;
        let manager = manager(&store);
        let a = create_user(&store).await;
        let b = create_user(&store).await;
        register(&store, &event, &a).await;
        let reg_b = register(&store, &event, &b).await;
        manager.cancel(reg_b.id).await.unwrap();

        let page = manager
            .list(
                event.id,
                Some(RegistrationStatus::Registered),
                PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].user_id, a.id);

        let all = manager
            .list(event.id, None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(all.total_count, 2);
    }
}
