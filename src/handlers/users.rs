use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};
use tracing::info;
use uuid::Uuid;

use super::common::{
    created_response, map_service_error, success_response, validate_input, ListParams,
};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::users::{CreateUserInput, UpdateUserInput, UserFilter},
};

/// Create a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = CreateUserInput,
    responses(
        (status = 201, description = "User created", body = crate::services::users::UserResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already exists", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .create(payload)
        .await
        .map_err(map_service_error)?;

    info!("User created: {}", user.id);
    Ok(created_response(user))
}

/// List users with pagination
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(
        ("skip" = Option<u64>, Query, description = "Rows to skip (default 0)"),
        ("take" = Option<u64>, Query, description = "Rows to return (default 10)"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("role" = Option<String>, Query, description = "Filter by role (USER, ADMIN)"),
    ),
    responses(
        (status = 200, description = "Users retrieved", body = crate::services::ListResponse<crate::services::users::UserResponse>),
    )
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(filter): Query<UserFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state
        .services
        .users
        .find_all(params.into(), filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(users))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User retrieved", body = crate::services::users::UserResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .services
        .users
        .find_one(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(user))
}

/// Update a user
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserInput,
    responses(
        (status = 200, description = "User updated", body = crate::services::users::UserResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already exists", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .users
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    info!("User updated: {}", id);
    Ok(success_response(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = crate::services::DeletedResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let confirmation = state
        .services
        .users
        .remove(id)
        .await
        .map_err(map_service_error)?;

    info!("User deleted: {}", id);
    Ok(success_response(confirmation))
}

/// Creates the router for user endpoints
pub fn user_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_user))
        .route("/", get(list_users))
        .route("/:id", get(get_user))
        .route("/:id", patch(update_user))
        .route("/:id", delete(delete_user))
}
