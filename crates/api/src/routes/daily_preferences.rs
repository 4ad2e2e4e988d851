//! Daily preference routes, addressed by user and calendar date.

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use domain::models::daily_preference::{ListPreferencesQuery, PreferencePayload};
use domain::models::DailyPreference;
use shared::pagination::{PageRequest, Paginated};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, ValidatedJson};

/// Set the preferences for one day, replacing any previous record.
///
/// PUT /api/v1/users/:user_id/preferences/:date
///
/// Responds 201 when the record was created and 200 when it was replaced.
pub async fn put_preference(
    State(state): State<AppState>,
    ApiPath((user_id, date)): ApiPath<(Uuid, NaiveDate)>,
    ValidatedJson(payload): ValidatedJson<PreferencePayload>,
) -> Result<(StatusCode, Json<DailyPreference>), ApiError> {
    let (preference, created) = state
        .registry
        .daily_preferences()
        .set(user_id, date, payload)
        .await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(preference)))
}

/// Fetch the preferences for one day.
///
/// GET /api/v1/users/:user_id/preferences/:date
pub async fn get_preference(
    State(state): State<AppState>,
    ApiPath((user_id, date)): ApiPath<(Uuid, NaiveDate)>,
) -> Result<Json<DailyPreference>, ApiError> {
    Ok(Json(
        state
            .registry
            .daily_preferences()
            .get(user_id, date)
            .await?,
    ))
}

/// List a user's preferences in date order, optionally within `from..=to`.
///
/// GET /api/v1/users/:user_id/preferences
pub async fn list_preferences(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ListPreferencesQuery>,
) -> Result<Json<Paginated<DailyPreference>>, ApiError> {
    if let (Some(from), Some(to)) = (query.from, query.to) {
        if from > to {
            return Err(ApiError::Validation(
                "from must not be after to".to_string(),
            ));
        }
    }
    let page = PageRequest::new(query.page, query.page_size)?;
    Ok(Json(
        state
            .registry
            .daily_preferences()
            .list(user_id, query.from, query.to, page)
            .await?,
    ))
}

/// DELETE /api/v1/users/:user_id/preferences/:date
pub async fn delete_preference(
    State(state): State<AppState>,
    ApiPath((user_id, date)): ApiPath<(Uuid, NaiveDate)>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .daily_preferences()
        .delete(user_id, date)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
