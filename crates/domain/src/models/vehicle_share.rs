//! Vehicle share domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{DomainError, DomainResult};

/// Upper bound for passenger seats in one vehicle.
pub const MAX_VEHICLE_CAPACITY: i32 = 50;

/// A shared-vehicle arrangement for an event: one driver, bounded passengers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleShare {
    pub id: Uuid,
    pub event_id: Uuid,
    pub driver_user_id: Uuid,
    /// Number of passenger seats (the driver is not counted).
    pub capacity: i32,
    /// Passenger user ids in joining order.
    pub passengers: Vec<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleShare {
    pub fn new(event_id: Uuid, request: CreateVehicleShareRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            event_id,
            driver_user_id: request.driver_user_id,
            capacity: request.capacity,
            passengers: Vec::new(),
            notes: request.notes,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn seats_available(&self) -> i32 {
        (self.capacity - self.passengers.len() as i32).max(0)
    }

    /// Checks whether `user_id` may take a seat in this vehicle.
    ///
    /// Membership in other shares of the event is checked by the caller.
    pub fn check_join(&self, user_id: Uuid) -> DomainResult<()> {
        if self.driver_user_id == user_id {
            return Err(DomainError::conflict(
                "The driver cannot join their own vehicle as a passenger",
            ));
        }
        if self.passengers.contains(&user_id) {
            return Err(DomainError::conflict(
                "User is already a passenger in this vehicle",
            ));
        }
        if self.seats_available() == 0 {
            return Err(DomainError::CapacityExceeded(format!(
                "Vehicle is full ({} of {} seats taken)",
                self.passengers.len(),
                self.capacity
            )));
        }
        Ok(())
    }

    /// Checks that the passengers already aboard fit into `capacity`.
    pub fn check_capacity(&self, capacity: i32) -> DomainResult<()> {
        if (capacity as usize) < self.passengers.len() {
            return Err(DomainError::conflict(format!(
                "Capacity {} is below the current {} passengers",
                capacity,
                self.passengers.len()
            )));
        }
        Ok(())
    }
}

/// Request payload for offering a vehicle share.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleShareRequest {
    pub driver_user_id: Uuid,

    #[validate(range(min = 1, max = 50, message = "Capacity must be between 1 and 50 seats"))]
    pub capacity: i32,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Request payload for updating a vehicle share (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateVehicleShareRequest {
    #[validate(range(min = 1, max = 50, message = "Capacity must be between 1 and 50 seats"))]
    pub capacity: Option<i32>,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Request payload for joining a vehicle share.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinVehicleShareRequest {
    pub passenger_user_id: Uuid,
}

/// Seat usage across all vehicle shares of an event.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct VehicleSeatStats {
    pub share_count: i64,
    pub seats_total: i64,
    pub seats_taken: i64,
}
