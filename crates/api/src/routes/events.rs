//! Event registry routes and the per-event dashboard.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::event::{CreateEventRequest, ListEventsQuery, UpdateEventRequest};
use domain::models::{Event, EventSummary};
use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, ValidatedJson};

/// Create an event with its days and initial hosts.
///
/// POST /api/v1/events
pub async fn create_event(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let event = state.registry.event_registry().create(request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// List events ordered by start date.
///
/// GET /api/v1/events
///
/// `from` and `to` bound the start date.
pub async fn list_events(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListEventsQuery>,
) -> Result<Json<Paginated<Event>>, ApiError> {
    let page = PageRequest::new(query.page, query.page_size)?;
    let events = state
        .registry
        .event_registry()
        .list(&query.filter(), page)
        .await?;
    Ok(Json(events))
}

/// GET /api/v1/events/:event_id
pub async fn get_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> Result<Json<Event>, ApiError> {
    Ok(Json(state.registry.event_registry().get(event_id).await?))
}

/// Update an event. Absent fields are kept; `null` clears optional ones.
///
/// PATCH /api/v1/events/:event_id
pub async fn update_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateEventRequest>,
) -> Result<Json<Event>, ApiError> {
    let event = state
        .registry
        .event_registry()
        .update(event_id, request)
        .await?;
    Ok(Json(event))
}

/// Delete an event and everything that hangs off it.
///
/// DELETE /api/v1/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.registry.event_registry().delete(event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Seat usage, registration breakdowns, hosts, vehicles and per-day
/// preference counts for one event.
///
/// GET /api/v1/events/:event_id/summary
pub async fn get_event_summary(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
) -> Result<Json<EventSummary>, ApiError> {
    let summary = state.registry.dashboard().summary(event_id).await?;
    info!(
        event_id = %event_id,
        seats_taken = summary.seats_taken,
        "Fetched event summary"
    );
    Ok(Json(summary))
}
