//! Daily preference entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::daily_preference::PreferencePayload;
use domain::models::DailyPreference;

/// Database row mapping for the daily_preferences table.
#[derive(Debug, Clone, FromRow)]
pub struct DailyPreferenceEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pref_date: NaiveDate,
    pub preferences: Json<PreferencePayload>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row returned by the upsert; `inserted` is false when a record was
/// overwritten.
#[derive(Debug, Clone, FromRow)]
pub struct UpsertedPreferenceEntity {
    #[sqlx(flatten)]
    pub preference: DailyPreferenceEntity,
    pub inserted: bool,
}

impl From<DailyPreferenceEntity> for DailyPreference {
    fn from(entity: DailyPreferenceEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            date: entity.pref_date,
            preferences: entity.preferences.0,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
