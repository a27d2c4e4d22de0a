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
    services::categories::{CategoryFilter, CreateCategoryInput, UpdateCategoryInput},
};

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "Categories",
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = crate::services::categories::CategoryResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "Category name already exists", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .create(payload)
        .await
        .map_err(map_service_error)?;

    info!("Category created: {}", category.id);
    Ok(created_response(category))
}

/// List categories with pagination
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "Categories",
    params(
        ("skip" = Option<u64>, Query, description = "Rows to skip (default 0)"),
        ("take" = Option<u64>, Query, description = "Rows to return (default 10)"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
    ),
    responses(
        (status = 200, description = "Categories retrieved", body = crate::services::ListResponse<crate::services::categories::CategoryResponse>),
    )
)]
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CategoryFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let categories = state
        .services
        .categories
        .find_all(params.into(), filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(categories))
}

/// Get a category by ID
#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category retrieved", body = crate::services::categories::CategoryResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .services
        .categories
        .find_one(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

/// Update a category
#[utoipa::path(
    patch,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = crate::services::categories::CategoryResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Category name already exists", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    info!("Category updated: {}", id);
    Ok(success_response(category))
}

/// Delete a category
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = crate::services::DeletedResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let confirmation = state
        .services
        .categories
        .remove(id)
        .await
        .map_err(map_service_error)?;

    info!("Category deleted: {}", id);
    Ok(success_response(confirmation))
}

/// Creates the router for category endpoints
pub fn category_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_category))
        .route("/", get(list_categories))
        .route("/:id", get(get_category))
        .route("/:id", patch(update_category))
        .route("/:id", delete(delete_category))
}
