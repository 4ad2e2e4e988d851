//! Participant lookup by phone number.

use std::sync::Arc;

use shared::pagination::PageRequest;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::participant::{ParticipantSchedule, ScheduleDay};
use crate::models::user::UserFilter;
use crate::repositories::{
    DailyPreferenceRepository, EventRepository, RegistrationRepository, UserRepository,
};

pub struct ParticipantLookup {
    events: Arc<dyn EventRepository>,
    users: Arc<dyn UserRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    preferences: Arc<dyn DailyPreferenceRepository>,
}

impl ParticipantLookup {
    pub fn new(
        events: Arc<dyn EventRepository>,
        users: Arc<dyn UserRepository>,
        registrations: Arc<dyn RegistrationRepository>,
        preferences: Arc<dyn DailyPreferenceRepository>,
    ) -> Self {
        Self {
            events,
            users,
            registrations,
            preferences,
        }
    }

    /// Finds the non-cancelled registration a phone number belongs to and
    /// merges each event day with the registering user's preferences.
    ///
    /// The phone number is matched against the registering user first and
    /// then against listed members.
    pub async fn search(
        &self,
        event_id: Uuid,
        phone_number: &str,
    ) -> DomainResult<ParticipantSchedule> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Event"))?;

        let filter = UserFilter {
            phone_number: Some(phone_number.to_string()),
            name: None,
        };
        let (users, _) = self.users.list(&filter, PageRequest::default()).await?;
        let mut registration = None;
        if let Some(user) = users.first() {
            registration = self.registrations.find_active(event_id, user.id).await?;
        }
        let matched_by_member = registration.is_none();
        if matched_by_member {
            registration = self
                .registrations
                .find_active_by_member_phone(event_id, phone_number)
                .await?;
        }
        let registration = registration.ok_or_else(|| DomainError::not_found("Participant"))?;

        let user = self
            .users
            .find_by_id(registration.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;

        let mut daily_schedule = Vec::with_capacity(event.days.len());
        for day in &event.days {
            let preference = self.preferences.find(user.id, day.event_date).await?;
            daily_schedule.push(ScheduleDay::new(day, preference));
        }

        let matched_member = if matched_by_member {
            registration.member_by_phone(phone_number).cloned()
        } else {
            None
        };
        debug!(
            event_id = %event_id,
            registration_id = %registration.id,
            by_member = matched_by_member,
            "Participant found"
        );
        Ok(ParticipantSchedule {
            user,
            registration,
            matched_member,
            daily_schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::models::daily_preference::PreferencePayload;
    use crate::models::event::EventDayInput;
    use crate::models::registration::RegistrationMember;
    use crate::repositories::memory::InMemoryStore;
    use crate::services::test_support::*;
    use crate::services::{DailyPreferenceStore, EventRegistry, RegistrationManager};

    fn lookup(store: &Arc<InMemoryStore>) -> ParticipantLookup {
        ParticipantLookup::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    fn member(name: &str, phone_number: Option<String>) -> RegistrationMember {
        RegistrationMember {
            name: name.to_string(),
            phone_number,
            age: None,
            gender: None,
            city: None,
            special_requirements: None,
        }
    }

    async fn event_with_days(store: &Arc<InMemoryStore>) -> crate::models::Event {
        let mut request = event_request(None);
        request.days = vec![
            EventDayInput {
                event_date: request.start_date,
                breakfast_provided: true,
                lunch_provided: true,
                dinner_provided: false,
                location_name: Some("Base camp".to_string()),
                notes: None,
            },
            EventDayInput {
                event_date: request.start_date + Duration::days(1),
                breakfast_provided: false,
                lunch_provided: false,
                dinner_provided: true,
                location_name: None,
                notes: Some("Temple visit".to_string()),
            },
        ];
        EventRegistry::new(store.clone())
            .create(request)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_by_user_phone_merges_preferences() {
        let store = store();
        let event = event_with_days(&store).await;
        let user = create_user(&store).await;
        register(&store, &event, &user).await;
        DailyPreferenceStore::new(store.clone(), store.clone())
            .set(
                user.id,
                event.start_date,
                PreferencePayload {
                    breakfast_at_host: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let found = lookup(&store)
            .search(event.id, &user.phone_number)
            .await
            .unwrap();
        assert_eq!(found.user.id, user.id);
        assert!(found.matched_member.is_none());
        assert_eq!(found.daily_schedule.len(), 2);
        assert_eq!(
            found.daily_schedule[0]
                .preferences
                .as_ref()
                .and_then(|p| p.breakfast_at_host),
            Some(true)
        );
        assert!(found.daily_schedule[1].preferences.is_none());
        assert_eq!(
            found.daily_schedule[1].notes.as_deref(),
            Some("Temple visit")
        );
    }

    #[tokio::test]
    async fn test_search_by_member_phone() {
        let store = store();
        let event = event_with_days(&store).await;
        let leader = create_user(&store).await;
        let member_phone = phone_number();
        let mut request = registration_request(leader.id, 2);
        request.members = vec![
            member("Group Leader", Some(leader.phone_number.clone())),
            member("Meera Joshi", Some(member_phone.clone())),
        ];
        RegistrationManager::new(store.clone(), store.clone(), store.clone())
            .register(event.id, request)
            .await
            .unwrap();

        let found = lookup(&store).search(event.id, &member_phone).await.unwrap();
        assert_eq!(found.user.id, leader.id);
        assert_eq!(found.registration.members.len(), 2);
        assert_eq!(
            found.matched_member.map(|m| m.name),
            Some("Meera Joshi".to_string())
        );
    }

    #[tokio::test]
    async fn test_search_ignores_cancelled_and_unknown() {
        let store = store();
        let event = event_with_days(&store).await;
        let user = create_user(&store).await;
        let registration = register(&store, &event, &user).await;
        RegistrationManager::new(store.clone(), store.clone(), store.clone())
            .cancel(registration.id)
            .await
            .unwrap();

        let lookup = lookup(&store);
        assert!(matches!(
            lookup.search(event.id, &user.phone_number).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            lookup.search(event.id, &phone_number()).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            lookup.search(Uuid::new_v4(), &user.phone_number).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
