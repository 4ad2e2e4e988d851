//! Repository interfaces, one per entity.
//!
//! Services depend only on these traits. `persistence` provides the
//! PostgreSQL implementations and [`memory::InMemoryStore`] implements all
//! of them over process memory.
//!
//! Methods that enforce a read-then-write rule (admission, promotion,
//! joining a vehicle, last-host removal) must evaluate the rule and apply
//! the write atomically with respect to concurrent calls.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::pagination::PageRequest;
use uuid::Uuid;

use crate::error::DomainResult;
use crate::models::daily_preference::PreferencePayload;
use crate::models::event::EventFilter;
use crate::models::registration::{NewRegistration, RegistrationStatus};
use crate::models::summary::{PreferenceCounts, RegistrationStats};
use crate::models::user::UserFilter;
use crate::models::vehicle_share::VehicleSeatStats;
use crate::models::{
    DailyPreference, Event, HostAssignment, Registration, User, VehicleShare,
};

#[async_trait]
pub trait HealthCheckRepository: Send + Sync {
    /// Checks that the storage backend answers.
    async fn check(&self) -> bool;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. Duplicate phone number is a conflict.
    async fn create(&self, user: User) -> DomainResult<User>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>>;
    /// Lists users ordered by name, returning the page and the total count.
    async fn list(&self, filter: &UserFilter, page: PageRequest) -> DomainResult<(Vec<User>, i64)>;
    /// Stores the updated fields. Returns `None` if the user is gone.
    async fn update(&self, user: User) -> DomainResult<Option<User>>;
    /// Deletes the user and everything that references it.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Inserts an event with its days and initial hosts in one unit.
    async fn create(&self, event: Event, hosts: Vec<HostAssignment>) -> DomainResult<Event>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Event>>;
    /// Lists events ordered by start date then creation time.
    async fn list(&self, filter: &EventFilter, page: PageRequest)
        -> DomainResult<(Vec<Event>, i64)>;
    /// Stores the scalar fields of an event. Days are left untouched.
    async fn update(&self, event: Event) -> DomainResult<Option<Event>>;
    /// Deletes the event and all of its dependents.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Admits a registration against the event's remaining seats.
    ///
    /// Fails with a conflict when the user already holds a non-cancelled
    /// registration for the event and with capacity-exceeded when the seats
    /// do not fit and the waiting list was not requested.
    async fn register(&self, registration: NewRegistration) -> DomainResult<Registration>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Registration>>;
    /// The user's non-cancelled registration for the event, if any.
    async fn find_active(&self, event_id: Uuid, user_id: Uuid)
        -> DomainResult<Option<Registration>>;
    /// The non-cancelled registration of the event listing a member with
    /// this phone number, if any.
    async fn find_active_by_member_phone(
        &self,
        event_id: Uuid,
        phone_number: &str,
    ) -> DomainResult<Option<Registration>>;
    async fn list_by_event(
        &self,
        event_id: Uuid,
        status: Option<RegistrationStatus>,
        page: PageRequest,
    ) -> DomainResult<(Vec<Registration>, i64)>;
    /// Cancels the registration and releases the user's vehicle seats and
    /// driven shares for the event. Idempotent.
    async fn cancel(&self, id: Uuid) -> DomainResult<Option<Registration>>;
    /// Changes the status of a registration that is not being cancelled,
    /// re-checking capacity when it starts occupying seats.
    async fn update_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> DomainResult<Option<Registration>>;
    /// Status counts over all registrations; type and transport counts
    /// over non-cancelled ones.
    async fn stats(&self, event_id: Uuid) -> DomainResult<RegistrationStats>;
}

#[async_trait]
pub trait HostAssignmentRepository: Send + Sync {
    /// Inserts an assignment. The same host twice for an event is a conflict.
    async fn create(&self, assignment: HostAssignment) -> DomainResult<HostAssignment>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<HostAssignment>>;
    async fn list_by_event(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<(Vec<HostAssignment>, i64)>;
    async fn update_notes(&self, id: Uuid, notes: Option<String>)
        -> DomainResult<Option<HostAssignment>>;
    /// Removes an assignment unless it is the last one of its event.
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;
    async fn count_by_event(&self, event_id: Uuid) -> DomainResult<i64>;
}

#[async_trait]
pub trait VehicleShareRepository: Send + Sync {
    /// Inserts a share after checking the driver's registration and that
    /// the driver is not already in a vehicle of the event.
    async fn create(&self, share: VehicleShare) -> DomainResult<VehicleShare>;
    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleShare>>;
    async fn list_by_event(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<(Vec<VehicleShare>, i64)>;
    /// Updates capacity and notes. Capacity below the passenger count is a
    /// conflict.
    async fn update(
        &self,
        id: Uuid,
        capacity: Option<i32>,
        notes: Option<String>,
    ) -> DomainResult<Option<VehicleShare>>;
    async fn delete(&self, id: Uuid) -> DomainResult<bool>;
    /// Seats a passenger. The share is unchanged on any failure.
    async fn join(&self, id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare>;
    /// Removes a passenger. Not-found when the user is not aboard.
    async fn leave(&self, id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare>;
    async fn seat_stats(&self, event_id: Uuid) -> DomainResult<VehicleSeatStats>;
}

#[async_trait]
pub trait DailyPreferenceRepository: Send + Sync {
    /// Creates or overwrites the record for the user and date.
    ///
    /// Returns the stored record and whether it was newly created.
    async fn upsert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        preferences: PreferencePayload,
    ) -> DomainResult<(DailyPreference, bool)>;
    async fn find(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DailyPreference>>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: PageRequest,
    ) -> DomainResult<(Vec<DailyPreference>, i64)>;
    async fn delete(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<bool>;
    /// Per-date preference counts over users holding seats in the event,
    /// for dates within `from..=to`. Dates without records are omitted.
    async fn day_counts(
        &self,
        event_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<(NaiveDate, PreferenceCounts)>>;
}
