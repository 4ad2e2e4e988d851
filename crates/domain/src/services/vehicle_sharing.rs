//! Vehicle sharing coordinator.

use std::sync::Arc;

use metrics::counter;
use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::vehicle_share::{CreateVehicleShareRequest, UpdateVehicleShareRequest};
use crate::models::VehicleShare;
use crate::repositories::{EventRepository, UserRepository, VehicleShareRepository};

pub struct VehicleSharingCoordinator {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    shares: Arc<dyn VehicleShareRepository>,
}

impl VehicleSharingCoordinator {
    pub fn new(
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        shares: Arc<dyn VehicleShareRepository>,
    ) -> Self {
        Self {
            events,
            users,
            shares,
        }
    }

    /// Offers a vehicle for an event. The driver must be registered for it.
    pub async fn create_share(
        &self,
        event_id: Uuid,
        request: CreateVehicleShareRequest,
    ) -> DomainResult<VehicleShare> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(DomainError::not_found("Event"));
        }
        if self.users.find_by_id(request.driver_user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }

        let share = self
            .shares
            .create(VehicleShare::new(event_id, request))
            .await?;
        info!(
            share_id = %share.id,
            event_id = %event_id,
            driver_user_id = %share.driver_user_id,
            capacity = share.capacity,
            "Vehicle share created"
        );
        Ok(share)
    }

    /// Seats a passenger. Fails with a capacity error when the vehicle is
    /// full, leaving the share unchanged.
    pub async fn join_share(&self, share_id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(DomainError::not_found("User"));
        }
        let share = self.shares.join(share_id, user_id).await?;
        counter!("vehicle_seats_joined_total").increment(1);
        info!(
            share_id = %share_id,
            user_id = %user_id,
            seats_available = share.seats_available(),
            "Passenger joined vehicle share"
        );
        Ok(share)
    }

    pub async fn leave_share(&self, share_id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare> {
        let share = self.shares.leave(share_id, user_id).await?;
        info!(share_id = %share_id, user_id = %user_id, "Passenger left vehicle share");
        Ok(share)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<VehicleShare> {
        self.shares
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle share"))
    }

    pub async fn list(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<Paginated<VehicleShare>> {
        if self.events.find_by_id(event_id).await?.is_none() {
            return Err(DomainError::not_found("Event"));
        }
        let (shares, total) = self.shares.list_by_event(event_id, page).await?;
        Ok(Paginated::new(shares, total, page))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleShareRequest,
    ) -> DomainResult<VehicleShare> {
        self.shares
            .update(id, request.capacity, request.notes)
            .await?
            .ok_or_else(|| DomainError::not_found("Vehicle share"))
    }

    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.shares.delete(id).await? {
            return Err(DomainError::not_found("Vehicle share"));
        }
        info!(share_id = %id, "Vehicle share deleted");
        Ok(())
    }
}
