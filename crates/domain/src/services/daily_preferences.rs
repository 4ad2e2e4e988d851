//! Daily preference store.

use std::sync::Arc;

use chrono::NaiveDate;
use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::models::daily_preference::PreferencePayload;
use crate::models::DailyPreference;
use crate::repositories::{DailyPreferenceRepository, UserRepository};

pub struct DailyPreferenceStore {
    users: Arc<dyn UserRepository>,
    preferences: Arc<dyn DailyPreferenceRepository>,
}

impl DailyPreferenceStore {
    pub fn new(
        users: Arc<dyn UserRepository>,
        preferences: Arc<dyn DailyPreferenceRepository>,
    ) -> Self {
        Self { users, preferences }
    }

    async fn require_user(&self, user_id: Uuid) -> DomainResult<()> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("User")),
        }
    }

    /// Creates or overwrites the preferences of a user for a date.
    ///
    /// The flag is `true` when a new record was created.
    pub async fn set(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        preferences: PreferencePayload,
    ) -> DomainResult<(DailyPreference, bool)> {
        self.require_user(user_id).await?;
        let (preference, created) = self.preferences.upsert(user_id, date, preferences).await?;
        info!(user_id = %user_id, date = %date, created, "Daily preference stored");
        Ok((preference, created))
    }

    pub async fn get(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<DailyPreference> {
        self.preferences
            .find(user_id, date)
            .await?
            .ok_or_else(|| DomainError::not_found("Daily preference"))
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        page: PageRequest,
    ) -> DomainResult<Paginated<DailyPreference>> {
        self.require_user(user_id).await?;
        let (preferences, total) = self
            .preferences
            .list_by_user(user_id, from, to, page)
            .await?;
        Ok(Paginated::new(preferences, total, page))
    }

    pub async fn delete(&self, user_id: Uuid, date: NaiveDate) -> DomainResult<()> {
        if !self.preferences.delete(user_id, date).await? {
            return Err(DomainError::not_found("Daily preference"));
        }
        Ok(())
    }
}
