//! Vehicle share entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::VehicleShare;

/// A vehicle_shares row joined with its ordered passenger ids.
#[derive(Debug, Clone, FromRow)]
pub struct VehicleShareEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub driver_user_id: Uuid,
    pub capacity: i32,
    pub notes: Option<String>,
    pub passengers: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<VehicleShareEntity> for VehicleShare {
    fn from(entity: VehicleShareEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            driver_user_id: entity.driver_user_id,
            capacity: entity.capacity,
            passengers: entity.passengers,
            notes: entity.notes,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_share_entity_to_domain() {
        let passengers = vec![Uuid::new_v4(), Uuid::new_v4()];
        let entity = VehicleShareEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            driver_user_id: Uuid::new_v4(),
            capacity: 4,
            notes: None,
            passengers: passengers.clone(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let share: VehicleShare = entity.into();
        assert_eq!(share.passengers, passengers);
        assert_eq!(share.seats_available(), 2);
    }
}
