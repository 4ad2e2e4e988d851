//! Registration routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::registration::{
    CreateRegistrationRequest, ListRegistrationsQuery, ParticipantSearchQuery,
    UpdateRegistrationStatusRequest,
};
use domain::models::{ParticipantSchedule, Registration};
use shared::pagination::{PageRequest, Paginated};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, ValidatedJson};

/// Register a user, or a group led by the user, for an event.
///
/// POST /api/v1/events/:event_id/registrations
///
/// Returns 409 `capacity_exceeded` when the seats are gone and the waitlist
/// was not requested, otherwise the registration lands in `waiting`.
pub async fn create_registration(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateRegistrationRequest>,
) -> Result<(StatusCode, Json<Registration>), ApiError> {
    let registration = state
        .registry
        .registration_manager()
        .register(event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(registration)))
}

/// List an event's registrations, optionally filtered by status.
///
/// GET /api/v1/events/:event_id/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ListRegistrationsQuery>,
) -> Result<Json<Paginated<Registration>>, ApiError> {
    let page = PageRequest::new(query.page, query.page_size)?;
    let registrations = state
        .registry
        .registration_manager()
        .list(event_id, query.status, page)
        .await?;
    Ok(Json(registrations))
}

/// Look up a participant by phone number: the registration, its members and
/// each event day merged with the registering user's preferences.
///
/// GET /api/v1/events/:event_id/participants/search?phone_number=
pub async fn search_participant(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ParticipantSearchQuery>,
) -> Result<Json<ParticipantSchedule>, ApiError> {
    query.validate()?;
    let participant = state
        .registry
        .participant_lookup()
        .search(event_id, &query.phone_number)
        .await?;
    Ok(Json(participant))
}

/// GET /api/v1/registrations/:registration_id
pub async fn get_registration(
    State(state): State<AppState>,
    ApiPath(registration_id): ApiPath<Uuid>,
) -> Result<Json<Registration>, ApiError> {
    Ok(Json(
        state
            .registry
            .registration_manager()
            .get(registration_id)
            .await?,
    ))
}

/// Cancel a registration. Cancelling twice is not an error.
///
/// POST /api/v1/registrations/:registration_id/cancel
pub async fn cancel_registration(
    State(state): State<AppState>,
    ApiPath(registration_id): ApiPath<Uuid>,
) -> Result<Json<Registration>, ApiError> {
    Ok(Json(
        state
            .registry
            .registration_manager()
            .cancel(registration_id)
            .await?,
    ))
}

/// Change a registration's status. Promotion to a seat-holding status
/// re-checks capacity.
///
/// PUT /api/v1/registrations/:registration_id/status
pub async fn update_registration_status(
    State(state): State<AppState>,
    ApiPath(registration_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateRegistrationStatusRequest>,
) -> Result<Json<Registration>, ApiError> {
    let registration = state
        .registry
        .registration_manager()
        .update_status(registration_id, request.status)
        .await?;
    Ok(Json(registration))
}
