//! Daily preference domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToiletPreference {
    Indian,
    Western,
}

/// A user's preferences for one date. At most one record per user and date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyPreference {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: NaiveDate,
    pub preferences: PreferencePayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Preference values for a day. Also the request body of the upsert.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
pub struct PreferencePayload {
    pub staying_with_group: Option<bool>,
    pub breakfast_at_host: Option<bool>,
    pub lunch_with_group: Option<bool>,
    pub dinner_at_host: Option<bool>,

    #[validate(length(max = 1000, message = "Physical limitations must be at most 1000 characters"))]
    pub physical_limitations: Option<String>,

    pub toilet_preference: Option<ToiletPreference>,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Query parameters for listing a user's preferences.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPreferencesQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
