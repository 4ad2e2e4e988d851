//! Vehicle sharing routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::vehicle_share::{
    CreateVehicleShareRequest, JoinVehicleShareRequest, UpdateVehicleShareRequest,
};
use domain::models::VehicleShare;
use serde::Deserialize;
use shared::pagination::{PageRequest, Paginated};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, ValidatedJson};

#[derive(Debug, Default, Deserialize)]
pub struct ListSharesQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Offer a vehicle for an event. The driver must hold an active
/// registration.
///
/// POST /api/v1/events/:event_id/vehicle-shares
pub async fn create_vehicle_share(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<CreateVehicleShareRequest>,
) -> Result<(StatusCode, Json<VehicleShare>), ApiError> {
    let share = state
        .registry
        .vehicle_sharing()
        .create_share(event_id, request)
        .await?;
    Ok((StatusCode::CREATED, Json(share)))
}

/// List the vehicles offered for an event.
///
/// GET /api/v1/events/:event_id/vehicle-shares
pub async fn list_vehicle_shares(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<ListSharesQuery>,
) -> Result<Json<Paginated<VehicleShare>>, ApiError> {
    let page = PageRequest::new(query.page, query.page_size)?;
    Ok(Json(
        state
            .registry
            .vehicle_sharing()
            .list(event_id, page)
            .await?,
    ))
}

/// GET /api/v1/vehicle-shares/:share_id
pub async fn get_vehicle_share(
    State(state): State<AppState>,
    ApiPath(share_id): ApiPath<Uuid>,
) -> Result<Json<VehicleShare>, ApiError> {
    Ok(Json(state.registry.vehicle_sharing().get(share_id).await?))
}

/// PATCH /api/v1/vehicle-shares/:share_id
///
/// Capacity cannot drop below the number of seated passengers.
pub async fn update_vehicle_share(
    State(state): State<AppState>,
    ApiPath(share_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateVehicleShareRequest>,
) -> Result<Json<VehicleShare>, ApiError> {
    Ok(Json(
        state
            .registry
            .vehicle_sharing()
            .update(share_id, request)
            .await?,
    ))
}

/// DELETE /api/v1/vehicle-shares/:share_id
pub async fn delete_vehicle_share(
    State(state): State<AppState>,
    ApiPath(share_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.registry.vehicle_sharing().delete(share_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Take a seat. A full vehicle yields 409 `capacity_exceeded`.
///
/// POST /api/v1/vehicle-shares/:share_id/passengers
pub async fn join_vehicle_share(
    State(state): State<AppState>,
    ApiPath(share_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<JoinVehicleShareRequest>,
) -> Result<Json<VehicleShare>, ApiError> {
    Ok(Json(
        state
            .registry
            .vehicle_sharing()
            .join_share(share_id, request.passenger_user_id)
            .await?,
    ))
}

/// Give up a seat.
///
/// DELETE /api/v1/vehicle-shares/:share_id/passengers/:user_id
pub async fn leave_vehicle_share(
    State(state): State<AppState>,
    ApiPath((share_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> Result<Json<VehicleShare>, ApiError> {
    Ok(Json(
        state
            .registry
            .vehicle_sharing()
            .leave_share(share_id, user_id)
            .await?,
    ))
}
