use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

use crate::errors::{ApiError, ServiceError};
use crate::services::PageParams;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(format!("Validation failed: {}", e)))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}

/// Pagination query parameters for list endpoints, defaulting to the
/// first ten rows.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, IntoParams)]
pub struct ListParams {
    /// Rows to skip from the start of the result set
    #[serde(default)]
    pub skip: u64,
    /// Maximum rows to return
    #[serde(default = "default_take")]
    pub take: u64,
}

fn default_take() -> u64 {
    10
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            take: default_take(),
        }
    }
}

impl From<ListParams> for PageParams {
    fn from(params: ListParams) -> Self {
        PageParams::new(params.skip, params.take)
    }
}
