//! User directory routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::user::{CreateUserRequest, ListUsersQuery, UpdateUserRequest};
use domain::models::User;
use shared::pagination::{PageRequest, Paginated};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiPath, ApiQuery, ValidatedJson};

/// Create a user.
///
/// POST /api/v1/users
///
/// Phone numbers are unique; a duplicate yields 409.
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.registry.user_directory().create(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List users, optionally filtered by exact phone number or name fragment.
///
/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let page = PageRequest::new(query.page, query.page_size)?;
    let users = state
        .registry
        .user_directory()
        .list(&query.filter(), page)
        .await?;
    Ok(Json(users))
}

/// GET /api/v1/users/:user_id
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.registry.user_directory().get(user_id).await?))
}

/// Update a user's name or phone number.
///
/// PATCH /api/v1/users/:user_id
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .registry
        .user_directory()
        .update(user_id, request)
        .await?;
    info!(user_id = %user_id, "User updated");
    Ok(Json(user))
}

/// Delete a user along with their registrations, host assignments, vehicle
/// shares and daily preferences.
///
/// DELETE /api/v1/users/:user_id
pub async fn delete_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.registry.user_directory().delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
