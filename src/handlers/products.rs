use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Router,
};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::common::{created_response, map_service_error, success_response, ListParams};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::products::{CreateProductInput, ImageUpload, ProductFilter, UpdateProductInput},
};

/// Upload limits enforced at this boundary; the service below assumes
/// payloads it receives are already validated.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// Request body cap: the image limit plus headroom for the form fields
const MAX_BODY_BYTES: usize = MAX_IMAGE_BYTES + 512 * 1024;

/// A parsed `multipart/form-data` product payload: scalar form fields plus
/// the optional `image` part.
struct ProductForm {
    fields: HashMap<String, String>,
    image: Option<ImageUpload>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut fields = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read image payload: {}", e))
                })?;

                validate_image(bytes.len(), &content_type)?;
                image = Some(ImageUpload {
                    bytes,
                    filename,
                    content_type,
                });
            } else {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read field '{}': {}", name, e))
                })?;
                fields.insert(name, value);
            }
        }

        Ok(Self { fields, image })
    }

    fn take(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key).filter(|v| !v.is_empty())
    }

    fn require(&mut self, key: &str) -> Result<String, ApiError> {
        self.take(key)
            .ok_or_else(|| ApiError::ValidationError(format!("Missing required field '{}'", key)))
    }

    fn parse<T: FromStr>(&mut self, key: &str) -> Result<Option<T>, ApiError> {
        self.take(key)
            .map(|raw| {
                raw.parse::<T>().map_err(|_| {
                    ApiError::ValidationError(format!("Field '{}' has an invalid value", key))
                })
            })
            .transpose()
    }

    fn into_create_input(mut self) -> Result<(CreateProductInput, Option<ImageUpload>), ApiError> {
        let input = CreateProductInput {
            name: self.require("name")?,
            sku: self.require("sku")?,
            price: self
                .parse::<Decimal>("price")?
                .ok_or_else(|| ApiError::ValidationError("Missing required field 'price'".into()))?,
            stock: self
                .parse::<i32>("stock")?
                .ok_or_else(|| ApiError::ValidationError("Missing required field 'stock'".into()))?,
            description: self.take("description"),
            barcode: self.take("barcode"),
            weight: self.parse("weight")?,
            unit: self.take("unit"),
            expiry_date: self.take("expiry_date"),
            category_id: self.parse("category_id")?,
            supplier_id: self.parse("supplier_id")?,
            is_active: self.parse("is_active")?,
        };

        Ok((input, self.image))
    }

    fn into_update_input(mut self) -> Result<(UpdateProductInput, Option<ImageUpload>), ApiError> {
        let input = UpdateProductInput {
            name: self.take("name"),
            sku: self.take("sku"),
            price: self.parse("price")?,
            stock: self.parse("stock")?,
            description: self.take("description"),
            barcode: self.take("barcode"),
            weight: self.parse("weight")?,
            unit: self.take("unit"),
            expiry_date: self.take("expiry_date"),
            category_id: self.parse("category_id")?,
            supplier_id: self.parse("supplier_id")?,
            is_active: self.parse("is_active")?,
        };

        Ok((input, self.image))
    }
}

fn validate_image(len: usize, content_type: &str) -> Result<(), ApiError> {
    if len > MAX_IMAGE_BYTES {
        return Err(ApiError::ValidationError(
            "Image exceeds the 5 MiB limit".to_string(),
        ));
    }
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(ApiError::ValidationError(format!(
            "Unsupported image type '{}': expected one of jpeg, jpg, png, webp",
            content_type
        )));
    }
    Ok(())
}

/// Create a new product from a multipart form with an optional image part
#[utoipa::path(
    post,
    path = "/api/v1/products",
    tag = "Products",
    responses(
        (status = 201, description = "Product created", body = crate::services::products::ProductResponse),
        (status = 400, description = "Invalid request data", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU or barcode already exists", body = crate::errors::ErrorResponse),
        (status = 502, description = "Image upload failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn create_product(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = ProductForm::read(multipart).await?;
    let (input, image) = form.into_create_input()?;

    let product = state
        .services
        .products
        .create(input, image)
        .await
        .map_err(map_service_error)?;

    info!("Product created: {}", product.id);
    Ok(created_response(product))
}

/// List products with pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    tag = "Products",
    params(
        ("skip" = Option<u64>, Query, description = "Rows to skip (default 0)"),
        ("take" = Option<u64>, Query, description = "Rows to return (default 10)"),
        ("is_active" = Option<bool>, Query, description = "Filter by active flag"),
        ("category_id" = Option<Uuid>, Query, description = "Filter by category"),
        ("supplier_id" = Option<Uuid>, Query, description = "Filter by supplier"),
    ),
    responses(
        (status = 200, description = "Products retrieved", body = crate::services::ListResponse<crate::services::products::ProductResponse>),
    )
)]
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
    Query(filter): Query<ProductFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .find_all(params.into(), filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

pub async fn list_products_by_category(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .find_by_category(category_id, params.into())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

pub async fn list_products_by_supplier(
    State(state): State<Arc<AppState>>,
    Path(supplier_id): Path<Uuid>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .services
        .products
        .find_by_supplier(supplier_id, params.into())
        .await
        .map_err(map_service_error)?;

    Ok(success_response(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = crate::services::products::ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .services
        .products
        .find_one(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Update a product from a multipart form, optionally replacing its image
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product updated", body = crate::services::products::ProductResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "SKU or barcode already exists", body = crate::errors::ErrorResponse),
        (status = 502, description = "Image upload failed", body = crate::errors::ErrorResponse),
    )
)]
pub async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = ProductForm::read(multipart).await?;
    let (input, image) = form.into_update_input()?;

    let product = state
        .services
        .products
        .update(id, input, image)
        .await
        .map_err(map_service_error)?;

    info!("Product updated: {}", id);
    Ok(success_response(product))
}

/// Delete a product and its stored image
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = crate::services::DeletedResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    )
)]
pub async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let confirmation = state
        .services
        .products
        .remove(id)
        .await
        .map_err(map_service_error)?;

    info!("Product deleted: {}", id);
    Ok(success_response(confirmation))
}

/// Creates the router for product endpoints
pub fn product_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/category/:category_id", get(list_products_by_category))
        .route("/supplier/:supplier_id", get(list_products_by_supplier))
        .route("/:id", get(get_product))
        .route("/:id", patch(update_product))
        .route("/:id", delete(delete_product))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
