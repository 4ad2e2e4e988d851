//! Event and event day entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::{Event, EventDay};

/// Database row mapping for the events table.
#[derive(Debug, Clone, FromRow)]
pub struct EventEntity {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_name: String,
    pub location_map_link: Option<String>,
    pub organization: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_start_date: Option<NaiveDate>,
    pub capacity: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EventEntity {
    /// Builds the domain event with its days.
    pub fn into_event(self, days: Vec<EventDay>) -> Event {
        Event {
            id: self.id,
            name: self.name,
            description: self.description,
            location_name: self.location_name,
            location_map_link: self.location_map_link,
            organization: self.organization,
            start_date: self.start_date,
            end_date: self.end_date,
            registration_start_date: self.registration_start_date,
            capacity: self.capacity,
            is_active: self.is_active,
            days,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row mapping for the event_days table.
#[derive(Debug, Clone, FromRow)]
pub struct EventDayEntity {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_date: NaiveDate,
    pub breakfast_provided: bool,
    pub lunch_provided: bool,
    pub dinner_provided: bool,
    pub location_name: Option<String>,
    pub notes: Option<String>,
}

impl From<EventDayEntity> for EventDay {
    fn from(entity: EventDayEntity) -> Self {
        Self {
            id: entity.id,
            event_id: entity.event_id,
            event_date: entity.event_date,
            breakfast_provided: entity.breakfast_provided,
            lunch_provided: entity.lunch_provided,
            dinner_provided: entity.dinner_provided,
            location_name: entity.location_name,
            notes: entity.notes,
        }
    }
}
