//! Event dashboard: read-only aggregates over one event.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::EventSummary;
use crate::repositories::{
    DailyPreferenceRepository, EventRepository, HostAssignmentRepository, RegistrationRepository,
    VehicleShareRepository,
};

pub struct EventDashboard {
    events: Arc<dyn EventRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    hosts: Arc<dyn HostAssignmentRepository>,
    shares: Arc<dyn VehicleShareRepository>,
    preferences: Arc<dyn DailyPreferenceRepository>,
}

impl EventDashboard {
    pub fn new(
        events: Arc<dyn EventRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        hosts: Arc<dyn HostAssignmentRepository>,
        shares: Arc<dyn VehicleShareRepository>,
        preferences: Arc<dyn DailyPreferenceRepository>,
    ) -> Self {
        Self {
            events,
            registrations,
            hosts,
            shares,
            preferences,
        }
    }

    /// Seat, host and vehicle totals plus a per-day breakdown of the
    /// attendees' meal, stay and toilet preferences.
    pub async fn summary(&self, event_id: Uuid) -> DomainResult<EventSummary> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;

        let registrations = self.registrations.stats(event_id).await?;
        let host_count = self.hosts.count_by_event(event_id).await?;
        let vehicles = self.shares.seat_stats(event_id).await?;
        let day_counts = self
            .preferences
            .day_counts(event_id, event.start_date, event.end_date)
            .await?;

        Ok(EventSummary::new(
            event.id,
            event.capacity,
            registrations,
            host_count,
            vehicles,
        )
        .with_days(&event.days, &day_counts))
    }
}
