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
    services::posts::{CreatePostInput, PostFilter, UpdatePostInput},
};

async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let post = state
        .services
        .posts
        .create(payload)
        .await
        .map_err(map_service_error)?;

    info!("Post created: {}", post.id);
    Ok(created_response(post))
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(filter): Query<PostFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .services
        .posts
        .find_all(params.into(), filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(posts))
}

async fn list_posts_by_author(
    State(state): State<Arc<AppState>>,
    Path(author_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .services
        .posts
        .find_by_author(author_id, params.into())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(posts))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .services
        .posts
        .find_one(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(post))
}

async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let post = state
        .services
        .posts
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    info!("Post updated: {}", id);
    Ok(success_response(post))
}

async fn publish_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .services
        .posts
        .publish(id)
        .await
        .map_err(map_service_error)?;

    info!("Post published: {}", id);
    Ok(success_response(post))
}

async fn unpublish_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .services
        .posts
        .unpublish(id)
        .await
        .map_err(map_service_error)?;

    info!("Post unpublished: {}", id);
    Ok(success_response(post))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let confirmation = state
        .services
        .posts
        .remove(id)
        .await
        .map_err(map_service_error)?;

    info!("Post deleted: {}", id);
    Ok(success_response(confirmation))
}

/// Creates the router for post endpoints
pub fn post_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_post))
        .route("/", get(list_posts))
        .route("/author/:author_id", get(list_posts_by_author))
        .route("/:id", get(get_post))
        .route("/:id", patch(update_post))
        .route("/:id/publish", post(publish_post))
        .route("/:id/unpublish", post(unpublish_post))
        .route("/:id", delete(delete_post))
}
