//! In-memory repository backend.
//!
//! All entities live in one [`MemoryData`] behind a single mutex, so every
//! repository call is serialized and read-then-write rules are atomic.
//! Used for the `memory` database backend and by the test suites.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use shared::pagination::PageRequest;
use uuid::Uuid;

use super::{
    DailyPreferenceRepository, EventRepository, HealthCheckRepository, HostAssignmentRepository,
    RegistrationRepository, UserRepository, VehicleShareRepository,
};
use crate::error::{DomainError, DomainResult};
use crate::models::daily_preference::PreferencePayload;
use crate::models::event::EventFilter;
use crate::models::registration::{
    admission_status, check_status_transition, NewRegistration, RegistrationStatus,
};
use crate::models::summary::{PreferenceCounts, RegistrationStats};
use crate::models::user::UserFilter;
use crate::models::vehicle_share::VehicleSeatStats;
use crate::models::{
    DailyPreference, Event, HostAssignment, Registration, User, VehicleShare,
};

/// The simulated database: one map per table.
#[derive(Debug, Default)]
pub struct MemoryData {
    pub users: HashMap<Uuid, User>,
    pub events: HashMap<Uuid, Event>,
    pub registrations: HashMap<Uuid, Registration>,
    pub host_assignments: HashMap<Uuid, HostAssignment>,
    pub vehicle_shares: HashMap<Uuid, VehicleShare>,
    pub preferences: HashMap<(Uuid, NaiveDate), DailyPreference>,
}

impl MemoryData {
    fn require_user(&self, id: Uuid) -> DomainResult<()> {
        if self.users.contains_key(&id) {
            Ok(())
        } else {
            Err(DomainError::not_found("User"))
        }
    }

    fn require_event(&self, id: Uuid) -> DomainResult<&Event> {
        self.events
            .get(&id)
            .ok_or_else(|| DomainError::not_found("Event"))
    }

    fn active_registration(&self, event_id: Uuid, user_id: Uuid) -> Option<&Registration> {
        self.registrations.values().find(|r| {
            r.event_id == event_id
                && r.user_id == user_id
                && r.status != RegistrationStatus::Cancelled
        })
    }

    fn seats_taken(&self, event_id: Uuid) -> i64 {
        self.registrations
            .values()
            .filter(|r| r.event_id == event_id)
            .map(Registration::seats)
            .sum()
    }

    /// Whether the user drives or rides in any share of the event other
    /// than `except`.
    fn in_other_vehicle(&self, event_id: Uuid, user_id: Uuid, except: Option<Uuid>) -> bool {
        self.vehicle_shares.values().any(|s| {
            s.event_id == event_id
                && Some(s.id) != except
                && (s.driver_user_id == user_id || s.passengers.contains(&user_id))
        })
    }

    /// Drops the shares the user drives and the seats they hold in the event.
    fn release_vehicles(&mut self, event_id: Uuid, user_id: Uuid) {
        self.vehicle_shares
            .retain(|_, s| !(s.event_id == event_id && s.driver_user_id == user_id));
        let now = Utc::now();
        for share in self
            .vehicle_shares
            .values_mut()
            .filter(|s| s.event_id == event_id)
        {
            let before = share.passengers.len();
            share.passengers.retain(|p| *p != user_id);
            if share.passengers.len() != before {
                share.updated_at = now;
            }
        }
    }

    fn cancel_registration(&mut self, id: Uuid) -> Option<Registration> {
        let registration = self.registrations.get_mut(&id)?;
        if registration.status != RegistrationStatus::Cancelled {
            registration.status = RegistrationStatus::Cancelled;
            registration.updated_at = Utc::now();
        }
        let registration = registration.clone();
        self.release_vehicles(registration.event_id, registration.user_id);
        Some(registration)
    }
}

/// Repository backend keeping every entity in process memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: Mutex<MemoryData>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> DomainResult<MutexGuard<'_, MemoryData>> {
        self.data
            .lock()
            .map_err(|_| DomainError::Storage("in-memory store lock poisoned".to_string()))
    }
}

/// Cuts one page out of an already ordered list.
fn paginate<T>(items: Vec<T>, page: PageRequest) -> (Vec<T>, i64) {
    let total = items.len() as i64;
    let data = items
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();
    (data, total)
}

#[async_trait]
impl HealthCheckRepository for InMemoryStore {
    async fn check(&self) -> bool {
        self.data.lock().is_ok()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: User) -> DomainResult<User> {
        let mut data = self.data()?;
        if data
            .users
            .values()
            .any(|u| u.phone_number == user.phone_number)
        {
            return Err(DomainError::conflict(
                "A user with this phone number already exists",
            ));
        }
        data.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        Ok(self.data()?.users.get(&id).cloned())
    }

    async fn list(&self, filter: &UserFilter, page: PageRequest) -> DomainResult<(Vec<User>, i64)> {
        let data = self.data()?;
        let name = filter.name.as_ref().map(|n| n.to_lowercase());
        let mut users: Vec<User> = data
            .users
            .values()
            .filter(|u| {
                filter
                    .phone_number
                    .as_ref()
                    .map_or(true, |p| &u.phone_number == p)
                    && name
                        .as_ref()
                        .map_or(true, |n| u.name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(paginate(users, page))
    }

    async fn update(&self, user: User) -> DomainResult<Option<User>> {
        let mut data = self.data()?;
        if !data.users.contains_key(&user.id) {
            return Ok(None);
        }
        if data
            .users
            .values()
            .any(|u| u.id != user.id && u.phone_number == user.phone_number)
        {
            return Err(DomainError::conflict(
                "A user with this phone number already exists",
            ));
        }
        data.users.insert(user.id, user.clone());
        Ok(Some(user))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let mut data = self.data()?;
        if data.users.remove(&id).is_none() {
            return Ok(false);
        }
        data.registrations.retain(|_, r| r.user_id != id);
        data.host_assignments.retain(|_, h| h.host_user_id != id);
        for assignment in data.host_assignments.values_mut() {
            if assignment.assigned_by == Some(id) {
                assignment.assigned_by = None;
            }
        }
        data.vehicle_shares.retain(|_, s| s.driver_user_id != id);
        for share in data.vehicle_shares.values_mut() {
            share.passengers.retain(|p| *p != id);
        }
        data.preferences.retain(|(user_id, _), _| *user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl EventRepository for InMemoryStore {
    async fn create(&self, event: Event, hosts: Vec<HostAssignment>) -> DomainResult<Event> {
        let mut data = self.data()?;
        for host in &hosts {
            data.require_user(host.host_user_id)?;
        }
        data.events.insert(event.id, event.clone());
        for host in hosts {
            data.host_assignments.insert(host.id, host);
        }
        Ok(event)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Event>> {
        Ok(self.data()?.events.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &EventFilter,
        page: PageRequest,
    ) -> DomainResult<(Vec<Event>, i64)> {
        let data = self.data()?;
        let mut events: Vec<Event> = data
            .events
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(paginate(events, page))
    }

    async fn update(&self, event: Event) -> DomainResult<Option<Event>> {
        let mut data = self.data()?;
        let Some(stored) = data.events.get_mut(&event.id) else {
            return Ok(None);
        };
        let days = std::mem::take(&mut stored.days);
        *stored = Event { days, ..event };
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let mut data = self.data()?;
        if data.events.remove(&id).is_none() {
            return Ok(false);
        }
        data.registrations.retain(|_, r| r.event_id != id);
        data.host_assignments.retain(|_, h| h.event_id != id);
        data.vehicle_shares.retain(|_, s| s.event_id != id);
        Ok(true)
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryStore {
    async fn register(&self, registration: NewRegistration) -> DomainResult<Registration> {
        let mut data = self.data()?;
        let capacity = data.require_event(registration.event_id)?.capacity;
        data.require_user(registration.user_id)?;
        if data
            .active_registration(registration.event_id, registration.user_id)
            .is_some()
        {
            return Err(DomainError::conflict(
                "User is already registered for this event",
            ));
        }

        let seats_taken = data.seats_taken(registration.event_id);
        let status = admission_status(
            capacity,
            seats_taken,
            registration.number_of_members,
            registration.join_waitlist,
        )?;
        let registration = registration.into_registration(status);
        data.registrations
            .insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<Registration>> {
        Ok(self.data()?.registrations.get(&id).cloned())
    }

    async fn find_active(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> DomainResult<Option<Registration>> {
        Ok(self.data()?.active_registration(event_id, user_id).cloned())
    }

    async fn find_active_by_member_phone(
        &self,
        event_id: Uuid,
        phone_number: &str,
    ) -> DomainResult<Option<Registration>> {
        let data = self.data()?;
        Ok(data
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status != RegistrationStatus::Cancelled)
            .find(|r| r.member_by_phone(phone_number).is_some())
            .cloned())
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
        status: Option<RegistrationStatus>,
        page: PageRequest,
    ) -> DomainResult<(Vec<Registration>, i64)> {
        let data = self.data()?;
        let mut registrations: Vec<Registration> = data
            .registrations
            .values()
            .filter(|r| r.event_id == event_id && status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        registrations.sort_by_key(|r| r.created_at);
        Ok(paginate(registrations, page))
    }

    async fn cancel(&self, id: Uuid) -> DomainResult<Option<Registration>> {
        Ok(self.data()?.cancel_registration(id))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> DomainResult<Option<Registration>> {
        let mut data = self.data()?;
        let Some(current) = data.registrations.get(&id).cloned() else {
            return Ok(None);
        };
        if status == RegistrationStatus::Cancelled {
            return Ok(data.cancel_registration(id));
        }

        if check_status_transition(current.status, status)? {
            let capacity = data.require_event(current.event_id)?.capacity;
            let seats_taken = data.seats_taken(current.event_id) - current.seats();
            admission_status(capacity, seats_taken, current.number_of_members, false)?;
        }

        let Some(registration) = data.registrations.get_mut(&id) else {
            return Ok(None);
        };
        if registration.status != status {
            registration.status = status;
            registration.updated_at = Utc::now();
        }
        Ok(Some(registration.clone()))
    }

    async fn stats(&self, event_id: Uuid) -> DomainResult<RegistrationStats> {
        let data = self.data()?;
        let mut stats = RegistrationStats::default();
        for registration in data.registrations.values().filter(|r| r.event_id == event_id) {
            stats.counts.add(registration.status, 1);
            stats.seats_taken += registration.seats();
            if registration.status != RegistrationStatus::Cancelled {
                stats.by_type.add(registration.registration_type, 1);
                stats.by_transport.add(registration.transportation_mode, 1);
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl HostAssignmentRepository for InMemoryStore {
    async fn create(&self, assignment: HostAssignment) -> DomainResult<HostAssignment> {
        let mut data = self.data()?;
        data.require_event(assignment.event_id)?;
        data.require_user(assignment.host_user_id)?;
        if data.host_assignments.values().any(|h| {
            h.event_id == assignment.event_id && h.host_user_id == assignment.host_user_id
        }) {
            return Err(DomainError::conflict(
                "Host is already assigned to this event",
            ));
        }
        data.host_assignments
            .insert(assignment.id, assignment.clone());
        Ok(assignment)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<HostAssignment>> {
        Ok(self.data()?.host_assignments.get(&id).cloned())
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<(Vec<HostAssignment>, i64)> {
        let data = self.data()?;
        let mut assignments: Vec<HostAssignment> = data
            .host_assignments
            .values()
            .filter(|h| h.event_id == event_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|h| h.created_at);
        Ok(paginate(assignments, page))
    }

    async fn update_notes(
        &self,
        id: Uuid,
        notes: Option<String>,
    ) -> DomainResult<Option<HostAssignment>> {
        let mut data = self.data()?;
        let Some(assignment) = data.host_assignments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(notes) = notes {
            assignment.notes = Some(notes);
        }
        assignment.updated_at = Utc::now();
        Ok(Some(assignment.clone()))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        let mut data = self.data()?;
        let Some(event_id) = data.host_assignments.get(&id).map(|h| h.event_id) else {
            return Ok(false);
        };
        let remaining = data
            .host_assignments
            .values()
            .filter(|h| h.event_id == event_id)
            .count();
        if remaining <= 1 {
            return Err(DomainError::conflict(
                "Cannot remove the last host of an event",
            ));
        }
        data.host_assignments.remove(&id);
        Ok(true)
    }

    async fn count_by_event(&self, event_id: Uuid) -> DomainResult<i64> {
        let data = self.data()?;
        Ok(data
            .host_assignments
            .values()
            .filter(|h| h.event_id == event_id)
            .count() as i64)
    }
}

#[async_trait]
impl VehicleShareRepository for InMemoryStore {
    async fn create(&self, share: VehicleShare) -> DomainResult<VehicleShare> {
        let mut data = self.data()?;
        data.require_event(share.event_id)?;
        data.require_user(share.driver_user_id)?;
        if data
            .active_registration(share.event_id, share.driver_user_id)
            .is_none()
        {
            return Err(DomainError::conflict(
                "Driver must hold an active registration for the event",
            ));
        }
        if data.in_other_vehicle(share.event_id, share.driver_user_id, None) {
            return Err(DomainError::conflict(
                "Driver already drives or rides in a vehicle for this event",
            ));
        }
        data.vehicle_shares.insert(share.id, share.clone());
        Ok(share)
    }

    async fn find_by_id(&self, id: Uuid) -> DomainResult<Option<VehicleShare>> {
        Ok(self.data()?.vehicle_shares.get(&id).cloned())
    }

    async fn list_by_event(
        &self,
        event_id: Uuid,
        page: PageRequest,
    ) -> DomainResult<(Vec<VehicleShare>, i64)> {
        let data = self.data()?;
        let mut shares: Vec<VehicleShare> = data
            .vehicle_shares
            .values()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        shares.sort_by_key(|s| s.created_at);
        Ok(paginate(shares, page))
    }

    async fn update(
        &self,
        id: Uuid,
        capacity: Option<i32>,
        notes: Option<String>,
    ) -> DomainResult<Option<VehicleShare>> {
        let mut data = self.data()?;
        let Some(share) = data.vehicle_shares.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(capacity) = capacity {
            share.check_capacity(capacity)?;
            share.capacity = capacity;
        }
        if let Some(notes) = notes {
            share.notes = Some(notes);
        }
        share.updated_at = Utc::now();
        Ok(Some(share.clone()))
    }

    async fn delete(&self, id: Uuid) -> DomainResult<bool> {
        Ok(self.data()?.vehicle_shares.remove(&id).is_some())
    }

    async fn join(&self, id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare> {
        let mut data = self.data()?;
        let event_id = data
            .vehicle_shares
            .get(&id)
            .map(|s| s.event_id)
            .ok_or_else(|| DomainError::not_found("Vehicle share"))?;
        data.require_user(user_id)?;
        if data.active_registration(event_id, user_id).is_none() {
            return Err(DomainError::conflict(
                "Passenger must hold an active registration for the event",
            ));
        }
        if data.in_other_vehicle(event_id, user_id, Some(id)) {
            return Err(DomainError::conflict(
                "User already drives or rides in another vehicle for this event",
            ));
        }

        let share = data
            .vehicle_shares
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Vehicle share"))?;
        share.check_join(user_id)?;
        share.passengers.push(user_id);
        share.updated_at = Utc::now();
        Ok(share.clone())
    }

    async fn leave(&self, id: Uuid, user_id: Uuid) -> DomainResult<VehicleShare> {
        let mut data = self.data()?;
        let share = data
            .vehicle_shares
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Vehicle share"))?;
        let position = share
            .passengers
            .iter()
            .position(|p| *p == user_id)
            .ok_or_else(|| DomainError::not_found("Passenger"))?;
        share.passengers.remove(position);
        share.updated_at = Utc::now();
        Ok(share.clone())
    }

    async fn seat_stats(&self, event_id: Uuid) -> DomainResult<VehicleSeatStats> {
        let data = self.data()?;
        let mut stats = VehicleSeatStats::default();
        for share in data.vehicle_shares.values().filter(|s| s.event_id == event_id) {
            stats.share_count += 1;
            stats.seats_total += share.capacity as i64;
            stats.seats_taken += share.passengers.len() as i64;
        }
        Ok(stats)
    }
}

#[async_trait]
impl DailyPreferenceRepository for InMemoryStore {
    async fn upsert(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        preferences: PreferencePayload,
    ) -> DomainResult<(DailyPreference, bool)> {
        let mut data = self.data()?;
        data.require_user(user_id)?;
        let now = Utc::now();
        if let Some(existing) = data.preferences.get_mut(&(user_id, date)) {
            existing.preferences = preferences;
            existing.updated_at = now;
            return Ok((existing.clone(), false));
        }

        let preference = DailyPreference {
            id: Uuid::new_v4(),
            user_id,
            date,
            preferences,
            created_at: now,
            updated_at: now,
        };
        data.preferences
            .insert((user_id, date), preference.clone());
        Ok((preference, true))
    }

    async fn find(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<Option<DailyPreference>> {
        Ok(self.data()?.preferences.get(&(user_id, date)).cloned())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: PageRequest,
    ) -> DomainResult<(Vec<DailyPreference>, i64)> {
        let data = self.data()?;
        let mut preferences: Vec<DailyPreference> = data
            .preferences
            .values()
            .filter(|p| {
                p.user_id == user_id
                    && from.map_or(true, |f| p.date >= f)
                    && to.map_or(true, |t| p.date <= t)
            })
            .cloned()
            .collect();
        preferences.sort_by_key(|p| p.date);
        Ok(paginate(preferences, page))
    }

    async fn delete(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<bool> {
        Ok(self.data()?.preferences.remove(&(user_id, date)).is_some())
    }

    async fn day_counts(
        &self,
        event_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DomainResult<Vec<(NaiveDate, PreferenceCounts)>> {
        let data = self.data()?;
        let mut counts: HashMap<NaiveDate, PreferenceCounts> = HashMap::new();
        for preference in data.preferences.values().filter(|p| {
            p.date >= from
                && p.date <= to
                && data
                    .active_registration(event_id, p.user_id)
                    .is_some_and(|r| r.status.occupies_seats())
        }) {
            counts
                .entry(preference.date)
                .or_default()
                .add(&preference.preferences);
        }
        let mut counts: Vec<_> = counts.into_iter().collect();
        counts.sort_by_key(|(date, _)| *date);
        Ok(counts)
    }
}
