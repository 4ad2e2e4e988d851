//! Event dashboard summary.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::daily_preference::{PreferencePayload, ToiletPreference};
use super::event::EventDay;
use super::registration::{RegistrationStatus, RegistrationType, TransportationMode};
use super::vehicle_share::VehicleSeatStats;

/// Registration counts per status for one event.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub registered: i64,
    pub waiting: i64,
    pub confirmed: i64,
    pub cancelled: i64,
}

impl StatusCounts {
    pub fn add(&mut self, status: RegistrationStatus, count: i64) {
        match status {
            RegistrationStatus::Registered => self.registered += count,
            RegistrationStatus::Waiting => self.waiting += count,
            RegistrationStatus::Confirmed => self.confirmed += count,
            RegistrationStatus::Cancelled => self.cancelled += count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RegistrationTypeCounts {
    pub individual: i64,
    pub group: i64,
}

impl RegistrationTypeCounts {
    pub fn add(&mut self, registration_type: RegistrationType, count: i64) {
        match registration_type {
            RegistrationType::Individual => self.individual += count,
            RegistrationType::Group => self.group += count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct TransportationCounts {
    pub public: i64,
    pub private: i64,
}

impl TransportationCounts {
    pub fn add(&mut self, mode: TransportationMode, count: i64) {
        match mode {
            TransportationMode::Public => self.public += count,
            TransportationMode::Private => self.private += count,
        }
    }
}

/// Registration figures of one event as reported by the repository.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationStats {
    pub counts: StatusCounts,
    pub seats_taken: i64,
    /// Non-cancelled registrations by type.
    pub by_type: RegistrationTypeCounts,
    /// Non-cancelled registrations by transportation mode.
    pub by_transport: TransportationCounts,
}

/// How many attendees chose each option on one date. Only explicit `true`
/// answers are counted.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct PreferenceCounts {
    /// Attendees with a preference record for the date.
    pub respondents: i64,
    pub staying_with_group: i64,
    pub breakfast_at_host: i64,
    pub lunch_with_group: i64,
    pub dinner_at_host: i64,
    pub toilet_indian: i64,
    pub toilet_western: i64,
}

impl PreferenceCounts {
    pub fn add(&mut self, preferences: &PreferencePayload) {
        let yes = |answer: Option<bool>| i64::from(answer == Some(true));
        self.respondents += 1;
        self.staying_with_group += yes(preferences.staying_with_group);
        self.breakfast_at_host += yes(preferences.breakfast_at_host);
        self.lunch_with_group += yes(preferences.lunch_with_group);
        self.dinner_at_host += yes(preferences.dinner_at_host);
        match preferences.toilet_preference {
            Some(ToiletPreference::Indian) => self.toilet_indian += 1,
            Some(ToiletPreference::Western) => self.toilet_western += 1,
            None => {}
        }
    }
}

/// One scheduled day with the attendees' answers for it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DaySummary {
    pub event_day_id: Uuid,
    pub date: NaiveDate,
    pub location_name: Option<String>,
    pub breakfast_provided: bool,
    pub lunch_provided: bool,
    pub dinner_provided: bool,
    pub preferences: PreferenceCounts,
}

/// Read-only aggregate view of an event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventSummary {
    pub event_id: Uuid,
    pub capacity: Option<i32>,
    pub seats_taken: i64,
    /// `None` when the event has no capacity limit.
    pub seats_remaining: Option<i64>,
    pub registrations: StatusCounts,
    pub registration_types: RegistrationTypeCounts,
    pub transportation_modes: TransportationCounts,
    pub host_count: i64,
    pub vehicle_share_count: i64,
    pub vehicle_seats_total: i64,
    pub vehicle_seats_taken: i64,
    /// Event days in date order.
    pub days: Vec<DaySummary>,
}

impl EventSummary {
    pub fn new(
        event_id: Uuid,
        capacity: Option<i32>,
        registrations: RegistrationStats,
        host_count: i64,
        vehicles: VehicleSeatStats,
    ) -> Self {
        Self {
            event_id,
            capacity,
            seats_taken: registrations.seats_taken,
            seats_remaining: capacity.map(|c| (c as i64 - registrations.seats_taken).max(0)),
            registrations: registrations.counts,
            registration_types: registrations.by_type,
            transportation_modes: registrations.by_transport,
            host_count,
            vehicle_share_count: vehicles.share_count,
            vehicle_seats_total: vehicles.seats_total,
            vehicle_seats_taken: vehicles.seats_taken,
            days: Vec::new(),
        }
    }

    /// Attaches the per-day breakdown. Days without answers get zero counts.
    pub fn with_days(mut self, days: &[EventDay], counts: &[(NaiveDate, PreferenceCounts)]) -> Self {
        self.days = days
            .iter()
            .map(|day| DaySummary {
                event_day_id: day.id,
                date: day.event_date,
                location_name: day.location_name.clone(),
                breakfast_provided: day.breakfast_provided,
                lunch_provided: day.lunch_provided,
                dinner_provided: day.dinner_provided,
                preferences: counts
                    .iter()
                    .find(|(date, _)| *date == day.event_date)
                    .map(|(_, c)| *c)
                    .unwrap_or_default(),
            })
            .collect();
        self
    }
}
