//! Registration domain model and seat admission rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{DomainError, DomainResult};

/// Lifecycle state of a registration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Registered,
    Waiting,
    Confirmed,
    Cancelled,
}

impl RegistrationStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Waiting => "waiting",
            RegistrationStatus::Confirmed => "confirmed",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }

    /// Parses from database string representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "registered" => Some(RegistrationStatus::Registered),
            "waiting" => Some(RegistrationStatus::Waiting),
            "confirmed" => Some(RegistrationStatus::Confirmed),
            "cancelled" => Some(RegistrationStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether a registration in this state holds seats.
    pub fn occupies_seats(&self) -> bool {
        matches!(
            self,
            RegistrationStatus::Registered | RegistrationStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationType {
    #[default]
    Individual,
    Group,
}

impl RegistrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationType::Individual => "individual",
            RegistrationType::Group => "group",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "individual" => Some(RegistrationType::Individual),
            "group" => Some(RegistrationType::Group),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportationMode {
    #[default]
    Public,
    Private,
}

impl TransportationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportationMode::Public => "public",
            TransportationMode::Private => "private",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(TransportationMode::Public),
            "private" => Some(TransportationMode::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// One person covered by a registration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RegistrationMember {
    #[validate(
        length(min = 1, max = 255, message = "Member name must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(custom(function = "shared::validation::validate_phone_number"))]
    pub phone_number: Option<String>,

    #[validate(range(min = 0, max = 120, message = "Age must be between 0 and 120"))]
    pub age: Option<i32>,

    pub gender: Option<Gender>,

    #[validate(length(max = 255, message = "City must be at most 255 characters"))]
    pub city: Option<String>,

    #[validate(length(
        max = 1000,
        message = "Special requirements must be at most 1000 characters"
    ))]
    pub special_requirements: Option<String>,
}

/// A user's registration for an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: RegistrationStatus,
    pub registration_type: RegistrationType,
    pub number_of_members: i32,
    pub transportation_mode: TransportationMode,
    pub notes: Option<String>,
    /// Details of the people covered; empty when none were supplied.
    #[serde(default)]
    pub members: Vec<RegistrationMember>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    /// The member listed with this phone number, if any.
    pub fn member_by_phone(&self, phone_number: &str) -> Option<&RegistrationMember> {
        self.members
            .iter()
            .find(|m| m.phone_number.as_deref() == Some(phone_number))
    }

    /// Seats this registration currently holds.
    pub fn seats(&self) -> i64 {
        if self.status.occupies_seats() {
            self.number_of_members as i64
        } else {
            0
        }
    }
}

/// A registration ready to be admitted; the status is decided at insert time.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub registration_type: RegistrationType,
    pub number_of_members: i32,
    pub transportation_mode: TransportationMode,
    pub notes: Option<String>,
    pub members: Vec<RegistrationMember>,
    pub join_waitlist: bool,
}

impl NewRegistration {
    pub fn new(event_id: Uuid, request: CreateRegistrationRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id: request.user_id,
            registration_type: request.registration_type,
            number_of_members: request.number_of_members,
            transportation_mode: request.transportation_mode,
            notes: request.notes,
            members: request.members,
            join_waitlist: request.join_waitlist,
        }
    }

    /// Materializes the stored registration with the admitted status.
    pub fn into_registration(self, status: RegistrationStatus) -> Registration {
        let now = Utc::now();
        Registration {
            id: self.id,
            event_id: self.event_id,
            user_id: self.user_id,
            status,
            registration_type: self.registration_type,
            number_of_members: self.number_of_members,
            transportation_mode: self.transportation_mode,
            notes: self.notes,
            members: self.members,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Decides the initial status of a registration requesting `requested` seats.
///
/// `capacity = None` means unlimited. Over capacity the registration is
/// either wait-listed or refused.
pub fn admission_status(
    capacity: Option<i32>,
    seats_taken: i64,
    requested: i32,
    join_waitlist: bool,
) -> DomainResult<RegistrationStatus> {
    match capacity {
        Some(capacity) if seats_taken + requested as i64 > capacity as i64 => {
            if join_waitlist {
                Ok(RegistrationStatus::Waiting)
            } else {
                Err(DomainError::CapacityExceeded(format!(
                    "Event has {} of {} seats available, {} requested",
                    (capacity as i64 - seats_taken).max(0),
                    capacity,
                    requested
                )))
            }
        }
        _ => Ok(RegistrationStatus::Registered),
    }
}

/// Checks a status change of an existing registration.
///
/// Returns `true` when the change needs a capacity check (the registration
/// starts occupying seats).
pub fn check_status_transition(
    current: RegistrationStatus,
    next: RegistrationStatus,
) -> DomainResult<bool> {
    if current == RegistrationStatus::Cancelled && next != RegistrationStatus::Cancelled {
        return Err(DomainError::conflict(
            "A cancelled registration cannot be reactivated",
        ));
    }
    Ok(next.occupies_seats() && !current.occupies_seats())
}

fn default_members() -> i32 {
    1
}

/// Request payload for registering a user for an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_member_count"))]
pub struct CreateRegistrationRequest {
    pub user_id: Uuid,

    #[serde(default)]
    pub registration_type: RegistrationType,

    #[serde(default = "default_members")]
    #[validate(range(min = 1, max = 100, message = "Number of members must be between 1 and 100"))]
    pub number_of_members: i32,

    #[serde(default)]
    pub transportation_mode: TransportationMode,

    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,

    /// Optional per-person details. When given there must be one entry per
    /// member.
    #[serde(default)]
    #[validate(nested)]
    pub members: Vec<RegistrationMember>,

    /// Land on the waiting list instead of failing when the event is full.
    #[serde(default)]
    pub join_waitlist: bool,
}

fn validate_member_count(request: &CreateRegistrationRequest) -> Result<(), ValidationError> {
    if request.registration_type == RegistrationType::Individual && request.number_of_members != 1
    {
        let mut err = ValidationError::new("individual_members");
        err.message = Some("Individual registration must have exactly 1 member".into());
        return Err(err);
    }
    let listed = request.members.len() as i64;
    if listed > 0 && listed != request.number_of_members as i64 {
        let mut err = ValidationError::new("member_details");
        err.message = Some("Member details must list exactly number_of_members entries".into());
        return Err(err);
    }
    Ok(())
}

/// Query parameters for looking up a participant of an event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ParticipantSearchQuery {
    #[validate(custom(function = "shared::validation::validate_phone_number"))]
    pub phone_number: String,
}

/// Request payload for changing a registration's status.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateRegistrationStatusRequest {
    pub status: RegistrationStatus,
}

/// Query parameters for listing an event's registrations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListRegistrationsQuery {
    pub status: Option<RegistrationStatus>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
