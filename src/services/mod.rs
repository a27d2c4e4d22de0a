pub mod categories;
pub mod posts;
pub mod products;
pub mod suppliers;
pub mod users;

pub use categories::CategoryService;
pub use posts::PostService;
pub use products::ProductService;
pub use suppliers::SupplierService;
pub use users::UserService;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Pagination window for list operations. The transport layer defaults
/// these to 0/10; a `None` window means "everything" at this level.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl PageParams {
    pub fn new(skip: u64, take: u64) -> Self {
        Self {
            skip: Some(skip),
            take: Some(take),
        }
    }
}

/// Metadata attached to every list response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ListMeta {
    /// Total rows matching the filter, irrespective of the window
    pub total: u64,
    pub skip: u64,
    /// Requested window size; the number of returned rows when not supplied
    pub take: u64,
}

impl ListMeta {
    pub fn new(total: u64, params: PageParams, returned: usize) -> Self {
        Self {
            total,
            skip: params.skip.unwrap_or(0),
            take: params.take.unwrap_or(returned as u64),
        }
    }
}

/// List envelope: `{ data, meta }`
#[derive(Debug, Serialize, ToSchema)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub meta: ListMeta,
}

/// Confirmation returned by every `remove` operation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub message: String,
}

impl DeletedResponse {
    pub fn new(entity: &str, id: Uuid) -> Self {
        Self {
            message: format!("{} with ID {} deleted successfully", entity, id),
        }
    }
}

/// Compact product row embedded in category and supplier detail views
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub price: rust_decimal::Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
}

impl From<crate::entities::product::Model> for ProductSummary {
    fn from(model: crate::entities::product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            price: model.price,
            stock: model.stock,
            image_url: model.image_url,
        }
    }
}

/// Parses a date-like input string: RFC 3339, or a bare `YYYY-MM-DD`
/// (interpreted as midnight UTC).
pub(crate) fn parse_date_input(field: &str, value: &str) -> Result<DateTime<Utc>, ServiceError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date.and_time(chrono::NaiveTime::MIN).and_utc());
    }

    Err(ServiceError::ValidationError(format!(
        "{} must be an ISO 8601 date, got '{}'",
        field, value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamps() {
        let dt = parse_date_input("birth_date", "2024-06-01T12:30:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-06-01T12:30:00+00:00");
    }

    #[test]
    fn parses_bare_dates_as_midnight_utc() {
        let dt = parse_date_input("expiry_date", "2025-01-31").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-01-31T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage_dates() {
        let err = parse_date_input("start_date", "next tuesday").unwrap_err();
        assert!(matches!(err, ServiceError::ValidationError(_)));
        assert!(err.to_string().contains("start_date"));
    }

    #[test]
    fn list_meta_take_defaults_to_returned_rows() {
        let meta = ListMeta::new(42, PageParams::default(), 7);
        assert_eq!(meta.total, 42);
        assert_eq!(meta.skip, 0);
        assert_eq!(meta.take, 7);

        let meta = ListMeta::new(42, PageParams::new(10, 5), 5);
        assert_eq!(meta.skip, 10);
        assert_eq!(meta.take, 5);
    }

    #[test]
    fn deleted_response_message_format() {
        let id = Uuid::nil();
        let resp = DeletedResponse::new("Category", id);
        assert_eq!(
            resp.message,
            format!("Category with ID {} deleted successfully", id)
        );
    }
}
