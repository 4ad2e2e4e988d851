//! Host assignment routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::host_assignment::{
    AssignHostRequest, BulkAssignHostsRequest, BulkAssignHostsResponse,
    UpdateHostAssignmentRequest,
};
use domain::models::HostAssignment;
use serde::Deserialize;
use shared::pagination::{PageRequest, Paginated};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, ValidatedJson};

/// Query parameters for listing an event's hosts.
#[derive(Debug, Default, Deserialize)]
pub struct ListHostsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Assign one host to an event.
///
/// POST /api/v1/events/:event_id/hosts
pub async fn assign_host(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<AssignHostRequest>,
) -> Result<(StatusCode, Json<HostAssignment>), ApiError> {
    let assignment = state
        .registry
        .host_assignments()
        .assign(event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Assign several hosts in one call. Each host succeeds or fails on its own.
///
/// POST /api/v1/events/:event_id/hosts/bulk
pub async fn assign_hosts_bulk(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<BulkAssignHostsRequest>,
) -> Result<(StatusCode, Json<BulkAssignHostsResponse>), ApiError> {
    let response = state
        .registry
        .host_assignments()
        .assign_many(event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/events/:event_id/hosts
pub async fn list_hosts(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ListHostsQuery>,
) -> Result<Json<Paginated<HostAssignment>>, ApiError> {
    let page = PageRequest::new(query.page, query.page_size)?;
    Ok(Json(
        state
            .registry
            .host_assignments()
            .list(event_id, page)
            .await?,
    ))
}

/// GET /api/v1/host-assignments/:assignment_id
pub async fn get_host_assignment(
    State(state): State<AppState>,
    ApiPath(assignment_id): ApiPath<Uuid>,
) -> Result<Json<HostAssignment>, ApiError> {
    Ok(Json(
        state.registry.host_assignments().get(assignment_id).await?,
    ))
}

/// PATCH /api/v1/host-assignments/:assignment_id
pub async fn update_host_assignment(
    State(state): State<AppState>,
    ApiPath(assignment_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateHostAssignmentRequest>,
) -> Result<Json<HostAssignment>, ApiError> {
    Ok(Json(
        state
            .registry
            .host_assignments()
            .update(assignment_id, request)
            .await?,
    ))
}

/// Remove a host from an event. The last host cannot be removed.
///
/// DELETE /api/v1/host-assignments/:assignment_id
pub async fn unassign_host(
    State(state): State<AppState>,
    ApiPath(assignment_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .registry
        .host_assignments()
        .unassign(assignment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
