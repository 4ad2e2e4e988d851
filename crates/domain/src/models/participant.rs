//! Participant lookup result: a registration with its day-by-day plan.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::daily_preference::PreferencePayload;
use super::event::EventDay;
use super::registration::{Registration, RegistrationMember};
use super::{DailyPreference, User};

/// One event day merged with the participant's preferences for that date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScheduleDay {
    pub event_day_id: Uuid,
    pub date: NaiveDate,
    pub location_name: Option<String>,
    pub breakfast_provided: bool,
    pub lunch_provided: bool,
    pub dinner_provided: bool,
    pub notes: Option<String>,
    /// `None` when no preference was recorded for the date.
    pub preference_id: Option<Uuid>,
    pub preferences: Option<PreferencePayload>,
}

impl ScheduleDay {
    pub fn new(day: &EventDay, preference: Option<DailyPreference>) -> Self {
        let (preference_id, preferences) = match preference {
            Some(p) => (Some(p.id), Some(p.preferences)),
            None => (None, None),
        };
        Self {
            event_day_id: day.id,
            date: day.event_date,
            location_name: day.location_name.clone(),
            breakfast_provided: day.breakfast_provided,
            lunch_provided: day.lunch_provided,
            dinner_provided: day.dinner_provided,
            notes: day.notes.clone(),
            preference_id,
            preferences,
        }
    }
}

/// Everything known about one participant of an event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParticipantSchedule {
    /// The registered user holding the registration.
    pub user: User,
    pub registration: Registration,
    /// Set when the phone number belongs to a listed member rather than the
    /// registering user.
    pub matched_member: Option<RegistrationMember>,
    pub daily_schedule: Vec<ScheduleDay>,
}
