//! Event and event day domain models.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{DomainError, DomainResult};

/// An event with its schedule, capacity and per-day plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location_name: String,
    pub location_map_link: Option<String>,
    pub organization: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub registration_start_date: Option<NaiveDate>,
    /// Maximum number of seats; `None` means unlimited.
    pub capacity: Option<i32>,
    pub is_active: bool,
    pub days: Vec<EventDay>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One scheduled day of an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventDay {
    pub id: Uuid,
    pub event_id: Uuid,
    pub event_date: NaiveDate,
    pub breakfast_provided: bool,
    pub lunch_provided: bool,
    pub dinner_provided: bool,
    pub location_name: Option<String>,
    pub notes: Option<String>,
}

impl Event {
    /// Builds a new event (and its days) from a validated request.
    pub fn new(request: CreateEventRequest) -> Self {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let mut days: Vec<EventDay> = request
            .days
            .into_iter()
            .map(|day| EventDay {
                id: Uuid::new_v4(),
                event_id: id,
                event_date: day.event_date,
                breakfast_provided: day.breakfast_provided,
                lunch_provided: day.lunch_provided,
                dinner_provided: day.dinner_provided,
                location_name: day.location_name,
                notes: day.notes,
            })
            .collect();
        days.sort_by_key(|d| d.event_date);

        Self {
            id,
            name: request.name.trim().to_string(),
            description: request.description,
            location_name: request.location_name,
            location_map_link: request.location_map_link,
            organization: request.organization,
            start_date: request.start_date,
            end_date: request.end_date,
            registration_start_date: request.registration_start_date,
            capacity: request.capacity,
            is_active: request.is_active,
            days,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update and re-checks the merged schedule.
    ///
    /// The merged date range must stay valid and still contain every
    /// existing event day.
    pub fn apply(&mut self, patch: UpdateEventRequest) -> DomainResult<()> {
        let start_date = patch.start_date.unwrap_or(self.start_date);
        let end_date = patch.end_date.unwrap_or(self.end_date);
        if end_date < start_date {
            return Err(DomainError::validation(
                "end_date must not be before start_date",
            ));
        }
        if let Some(day) = self
            .days
            .iter()
            .find(|d| d.event_date < start_date || d.event_date > end_date)
        {
            return Err(DomainError::validation(format!(
                "event day {} falls outside the event date range",
                day.event_date
            )));
        }

        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(location_name) = patch.location_name {
            self.location_name = location_name;
        }
        if let Some(link) = patch.location_map_link {
            self.location_map_link = link;
        }
        if let Some(organization) = patch.organization {
            self.organization = organization;
        }
        if let Some(date) = patch.registration_start_date {
            self.registration_start_date = date;
        }
        if let Some(capacity) = patch.capacity {
            self.capacity = capacity;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.start_date = start_date;
        self.end_date = end_date;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Checks that the event currently accepts registrations.
    pub fn ensure_open_for_registration(&self, today: NaiveDate) -> DomainResult<()> {
        if !self.is_active {
            return Err(DomainError::conflict("Event is not active"));
        }
        match self.registration_start_date {
            Some(opens) if opens > today => Err(DomainError::conflict(format!(
                "Registration opens on {}",
                opens
            ))),
            _ => Ok(()),
        }
    }
}

fn default_active() -> bool {
    true
}

/// One day of the schedule supplied when creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDayInput {
    pub event_date: NaiveDate,
    #[serde(default)]
    pub breakfast_provided: bool,
    #[serde(default)]
    pub lunch_provided: bool,
    #[serde(default)]
    pub dinner_provided: bool,
    pub location_name: Option<String>,
    pub notes: Option<String>,
}

/// Request payload for creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_event_schedule"))]
pub struct CreateEventRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,

    #[validate(
        length(min = 1, max = 255, message = "Location name must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub location_name: String,

    #[validate(url(message = "Location map link must be a valid URL"))]
    pub location_map_link: Option<String>,

    #[validate(length(max = 255, message = "Organization must be at most 255 characters"))]
    pub organization: Option<String>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub registration_start_date: Option<NaiveDate>,

    #[validate(range(min = 0, message = "Capacity must not be negative"))]
    pub capacity: Option<i32>,

    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub days: Vec<EventDayInput>,

    /// Users assigned as hosts together with the event.
    #[serde(default)]
    pub host_user_ids: Vec<Uuid>,
}

fn validate_event_schedule(request: &CreateEventRequest) -> Result<(), ValidationError> {
    shared::validation::validate_date_range(request.start_date, request.end_date)?;

    let mut seen = HashSet::new();
    for day in &request.days {
        if day.event_date < request.start_date || day.event_date > request.end_date {
            let mut err = ValidationError::new("day_out_of_range");
            err.message = Some("Event days must fall within the event date range".into());
            return Err(err);
        }
        if !seen.insert(day.event_date) {
            let mut err = ValidationError::new("duplicate_day");
            err.message = Some("Each event date may appear only once".into());
            return Err(err);
        }
        if day.location_name.as_ref().is_some_and(|l| l.chars().count() > 255)
            || day.notes.as_ref().is_some_and(|n| n.chars().count() > 1000)
        {
            let mut err = ValidationError::new("day_length");
            err.message = Some(
                "Event day location must be at most 255 and notes at most 1000 characters".into(),
            );
            return Err(err);
        }
    }

    let mut hosts = HashSet::new();
    if !request.host_user_ids.iter().all(|id| hosts.insert(*id)) {
        let mut err = ValidationError::new("duplicate_host");
        err.message = Some("A host may be listed only once".into());
        return Err(err);
    }

    Ok(())
}

/// Keeps an explicit JSON `null` apart from an absent field: absent stays
/// `None`, `null` becomes `Some(None)`.
fn clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Request payload for updating an event (partial update).
///
/// Optional event attributes use a nested `Option`: an absent field keeps
/// the stored value and `null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEventRequest {
    #[validate(
        length(min = 1, max = 255, message = "Name must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "clearable")]
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<Option<String>>,

    #[validate(
        length(min = 1, max = 255, message = "Location name must be 1-255 characters"),
        custom(function = "shared::validation::validate_not_blank")
    )]
    pub location_name: Option<String>,

    #[serde(default, deserialize_with = "clearable")]
    #[validate(url(message = "Location map link must be a valid URL"))]
    pub location_map_link: Option<Option<String>>,

    #[serde(default, deserialize_with = "clearable")]
    #[validate(length(max = 255, message = "Organization must be at most 255 characters"))]
    pub organization: Option<Option<String>>,

    pub start_date: Option<NaiveDate>,

    pub end_date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "clearable")]
    pub registration_start_date: Option<Option<NaiveDate>>,

    /// `null` makes the event unlimited.
    #[serde(default, deserialize_with = "clearable")]
    #[validate(range(min = 0, message = "Capacity must not be negative"))]
    pub capacity: Option<Option<i32>>,

    pub is_active: Option<bool>,
}

/// Filters for listing events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Events starting on or after this date.
    pub from: Option<NaiveDate>,
    /// Events starting on or before this date.
    pub to: Option<NaiveDate>,
}

impl EventFilter {
    /// Whether an event passes the filter.
    pub fn matches(&self, event: &Event) -> bool {
        self.is_active.map_or(true, |a| event.is_active == a)
            && self.name.as_ref().map_or(true, |n| {
                event.name.to_lowercase().contains(&n.to_lowercase())
            })
            && self.from.map_or(true, |from| event.start_date >= from)
            && self.to.map_or(true, |to| event.start_date <= to)
    }
}

/// Query parameters for listing events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsQuery {
    pub is_active: Option<bool>,
    pub name: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ListEventsQuery {
    pub fn filter(&self) -> EventFilter {
        EventFilter {
            is_active: self.is_active,
            name: self.name.clone(),
            from: self.from,
            to: self.to,
        }
    }
}
