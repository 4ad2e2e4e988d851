//! Registration entity (database row mapping).

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::registration::{
    Registration, RegistrationMember, RegistrationStatus, RegistrationType, TransportationMode,
};
use domain::DomainError;

/// Database row mapping for the registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
    pub registration_type: String,
    pub number_of_members: i32,
    pub transportation_mode: String,
    pub notes: Option<String>,
    pub members: Json<Vec<RegistrationMember>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn unknown(column: &str, value: &str) -> DomainError {
    DomainError::Storage(format!("unknown {} '{}' in registrations", column, value))
}

impl TryFrom<RegistrationEntity> for Registration {
    type Error = DomainError;

    fn try_from(entity: RegistrationEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            event_id: entity.event_id,
            user_id: entity.user_id,
            status: RegistrationStatus::parse(&entity.status)
                .ok_or_else(|| unknown("status", &entity.status))?,
            registration_type: RegistrationType::parse(&entity.registration_type)
                .ok_or_else(|| unknown("registration_type", &entity.registration_type))?,
            number_of_members: entity.number_of_members,
            transportation_mode: TransportationMode::parse(&entity.transportation_mode)
                .ok_or_else(|| unknown("transportation_mode", &entity.transportation_mode))?,
            notes: entity.notes,
            members: entity.members.0,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(status: &str) -> RegistrationEntity {
        RegistrationEntity {
            id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            status: status.to_string(),
            registration_type: "group".to_string(),
            number_of_members: 3,
            transportation_mode: "private".to_string(),
            notes: None,
            members: Json(vec![RegistrationMember {
                name: "Asha Patil".to_string(),
                phone_number: Some("+919820000001".to_string()),
                age: Some(41),
                gender: None,
                city: Some("Pune".to_string()),
                special_requirements: None,
            }]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_registration_entity_to_domain() {
        let registration = Registration::try_from(entity("waiting")).unwrap();
        assert_eq!(registration.status, RegistrationStatus::Waiting);
        assert_eq!(registration.registration_type, RegistrationType::Group);
        assert_eq!(
            registration.transportation_mode,
            TransportationMode::Private
        );
        assert_eq!(
            registration.member_by_phone("+919820000001").map(|m| m.age),
            Some(Some(41))
        );
    }

    #[test]
    fn test_unknown_status_is_storage_error() {
        assert!(matches!(
            Registration::try_from(entity("pending")),
            Err(DomainError::Storage(_))
        ));
    }
}
