//! Event registry service: event definitions and their days.

use std::sync::Arc;

use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::event::{CreateEventRequest, EventFilter, UpdateEventRequest};
use crate::models::{Event, HostAssignment};
use crate::repositories::EventRepository;

pub struct EventRegistry {
    events: Arc<dyn EventRepository>,
}

impl EventRegistry {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// Creates an event together with its days and initial hosts.
    pub async fn create(&self, mut request: CreateEventRequest) -> DomainResult<Event> {
        let host_ids = std::mem::take(&mut request.host_user_ids);
        let event = Event::new(request);
        let hosts = host_ids
            .into_iter()
            .map(|host| HostAssignment::new(event.id, host, None, None))
            .collect();

        let event = self.events.create(event, hosts).await?;
        info!(
            event_id = %event.id,
            days = event.days.len(),
            capacity = ?event.capacity,
            "Event created"
        );
        Ok(event)
    }

    pub async fn get(&self, id: Uuid) -> DomainResult<Event> {
        self.events
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))
    }

    pub async fn list(&self, filter: &EventFilter, page: PageRequest) -> DomainResult<Paginated<Event>> {
        let (events, total) = self.events.list(filter, page).await?;
        Ok(Paginated::new(events, total, page))
    }

    /// Applies a partial update. Lowering the capacity below the seats
    /// already taken is allowed; it only affects new admissions.
    pub async fn update(&self, id: Uuid, patch: UpdateEventRequest) -> DomainResult<Event> {
        let mut event = self.get(id).await?;
        event.apply(patch)?;
        let event = self
            .events
            .update(event)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;
        info!(event_id = %event.id, "Event updated");
        Ok(event)
    }

    /// Deletes the event and everything attached to it.
    pub async fn delete(&self, id: Uuid) -> DomainResult<()> {
        if !self.events.delete(id).await? {
            return Err(DomainError::not_found("Event"));
        }
        info!(event_id = %id, "Event deleted");
        Ok(())
    }
}
