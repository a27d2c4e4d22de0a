use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{category, product, supplier, Category, Product, Supplier},
    errors::{conflict_on_unique, ServiceError},
    events::{Event, EventSender},
    storage::{image_object_path, object_path_from_url, ObjectStorage},
};

use super::{parse_date_input, DeletedResponse, ListMeta, ListResponse, PageParams};

/// Service for managing products and their stored images
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    storage: Arc<dyn ObjectStorage>,
}

/// An image payload handed down from the transport layer. Size and MIME
/// type are validated at that boundary; this layer assumes both are good.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Bytes,
    pub filename: String,
    pub content_type: String,
}

/// Input for creating a product
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    #[validate(length(min = 1, message = "sku must not be empty"))]
    pub sku: String,
    pub barcode: Option<String>,
    pub weight: Option<Decimal>,
    pub unit: Option<String>,
    /// ISO 8601 date or datetime
    pub expiry_date: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Input for updating a product; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    #[validate(length(min = 1, message = "sku must not be empty"))]
    pub sku: Option<String>,
    pub barcode: Option<String>,
    pub weight: Option<Decimal>,
    pub unit: Option<String>,
    /// ISO 8601 date or datetime
    pub expiry_date: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

/// Equality filters for product listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ProductFilter {
    pub is_active: Option<bool>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
}

/// Compact category row embedded in product responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}

/// Compact supplier row embedded in product responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SupplierSummary {
    pub id: Uuid,
    pub name: String,
}

/// Product shape returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub sku: String,
    pub barcode: Option<String>,
    pub weight: Option<Decimal>,
    pub unit: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: Option<CategorySummary>,
    pub supplier: Option<SupplierSummary>,
}

impl ProductResponse {
    fn from_model(
        model: product::Model,
        category: Option<CategorySummary>,
        supplier: Option<SupplierSummary>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            stock: model.stock,
            sku: model.sku,
            barcode: model.barcode,
            weight: model.weight,
            unit: model.unit,
            expiry_date: model.expiry_date,
            image_url: model.image_url,
            is_active: model.is_active,
            category_id: model.category_id,
            supplier_id: model.supplier_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            category,
            supplier,
        }
    }
}

impl ProductService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            db,
            event_sender,
            storage,
        }
    }

    /// Create a new product, uploading its image first when one is attached.
    ///
    /// The upload deliberately happens before the row insert; if the insert
    /// then fails, the stored object is orphaned and left for bucket-side
    /// lifecycle tooling to sweep.
    #[instrument(skip(self, image))]
    pub async fn create(
        &self,
        input: CreateProductInput,
        image: Option<ImageUpload>,
    ) -> Result<ProductResponse, ServiceError> {
        self.ensure_unique_sku(&input.sku, None).await?;
        if let Some(ref barcode) = input.barcode {
            self.ensure_unique_barcode(barcode, None).await?;
        }
        validate_amounts(Some(input.price), Some(input.stock))?;

        let expiry_date = input
            .expiry_date
            .as_deref()
            .map(|raw| parse_date_input("expiry_date", raw))
            .transpose()?;

        let image_url = match image {
            Some(image) => {
                let path = image_object_path(&input.sku, &image.filename);
                let url = self
                    .storage
                    .upload(&path, image.bytes, &image.content_type)
                    .await?;
                Some(url)
            }
            None => None,
        };

        let product_id = Uuid::new_v4();
        let now = Utc::now();

        let model = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            stock: Set(input.stock),
            sku: Set(input.sku),
            barcode: Set(input.barcode),
            weight: Set(input.weight),
            unit: Set(input.unit),
            expiry_date: Set(expiry_date),
            image_url: Set(image_url),
            is_active: Set(input.is_active.unwrap_or(true)),
            category_id: Set(input.category_id),
            supplier_id: Set(input.supplier_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let product = model
            .insert(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Product SKU or barcode already exists"))?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!(product_id = %product_id, sku = %product.sku, "Created product");
        self.with_relations(product).await
    }

    /// List products with pagination and optional filters.
    ///
    /// Page and total are read concurrently, not in one snapshot.
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        params: PageParams,
        filter: ProductFilter,
    ) -> Result<ListResponse<ProductResponse>, ServiceError> {
        let db = &*self.db;

        let mut query = Product::find();
        if let Some(is_active) = filter.is_active {
            query = query.filter(product::Column::IsActive.eq(is_active));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(supplier_id) = filter.supplier_id {
            query = query.filter(product::Column::SupplierId.eq(supplier_id));
        }
        let query = query.order_by_desc(product::Column::CreatedAt);

        let (rows, total) = tokio::try_join!(
            query
                .clone()
                .offset(params.skip)
                .limit(params.take)
                .all(db),
            query.clone().count(db),
        )?;

        let meta = ListMeta::new(total, params, rows.len());
        let data = self.with_relations_batch(rows).await?;

        Ok(ListResponse { data, meta })
    }

    /// List products in one category
    pub async fn find_by_category(
        &self,
        category_id: Uuid,
        params: PageParams,
    ) -> Result<ListResponse<ProductResponse>, ServiceError> {
        self.find_all(
            params,
            ProductFilter {
                category_id: Some(category_id),
                ..Default::default()
            },
        )
        .await
    }

    /// List products from one supplier
    pub async fn find_by_supplier(
        &self,
        supplier_id: Uuid,
        params: PageParams,
    ) -> Result<ListResponse<ProductResponse>, ServiceError> {
        self.find_all(
            params,
            ProductFilter {
                supplier_id: Some(supplier_id),
                ..Default::default()
            },
        )
        .await
    }

    /// Get a product by ID with category and supplier summaries
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> Result<ProductResponse, ServiceError> {
        let product = self.get(id).await?;
        self.with_relations(product).await
    }

    /// Update a product, replacing its stored image when a new one arrives.
    #[instrument(skip(self, image))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
        image: Option<ImageUpload>,
    ) -> Result<ProductResponse, ServiceError> {
        let current = self.get(id).await?;

        // Uniqueness is re-checked only for fields that actually change;
        // updating a product to its own SKU or barcode is always allowed.
        if let Some(ref sku) = input.sku {
            if *sku != current.sku {
                self.ensure_unique_sku(sku, Some(id)).await?;
            }
        }
        if let Some(ref barcode) = input.barcode {
            if current.barcode.as_deref() != Some(barcode.as_str()) {
                self.ensure_unique_barcode(barcode, Some(id)).await?;
            }
        }
        validate_amounts(input.price, input.stock)?;

        let expiry_date = input
            .expiry_date
            .as_deref()
            .map(|raw| parse_date_input("expiry_date", raw))
            .transpose()?;

        // Replace the stored image before touching the row: delete the old
        // object best-effort, then upload under the (possibly new) SKU.
        let new_image_url = match image {
            Some(image) => {
                if let Some(ref old_url) = current.image_url {
                    self.delete_image_best_effort(old_url).await;
                }
                let sku = input.sku.as_deref().unwrap_or(&current.sku);
                let path = image_object_path(sku, &image.filename);
                let url = self
                    .storage
                    .upload(&path, image.bytes, &image.content_type)
                    .await?;
                Some(url)
            }
            None => None,
        };
        let image_replaced = new_image_url.is_some();

        let mut active: product::ActiveModel = current.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(stock) = input.stock {
            active.stock = Set(stock);
        }
        if let Some(sku) = input.sku {
            active.sku = Set(sku);
        }
        if let Some(barcode) = input.barcode {
            active.barcode = Set(Some(barcode));
        }
        if let Some(weight) = input.weight {
            active.weight = Set(Some(weight));
        }
        if let Some(unit) = input.unit {
            active.unit = Set(Some(unit));
        }
        if let Some(expiry_date) = expiry_date {
            active.expiry_date = Set(Some(expiry_date));
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(Some(category_id));
        }
        if let Some(supplier_id) = input.supplier_id {
            active.supplier_id = Set(Some(supplier_id));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(url) = new_image_url {
            active.image_url = Set(Some(url));
        }
        active.updated_at = Set(Utc::now());

        let product = active
            .update(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Product SKU or barcode already exists"))?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(id))
            .await;
        if image_replaced {
            self.event_sender
                .send_or_log(Event::ProductImageReplaced(id))
                .await;
        }

        info!(product_id = %id, "Updated product");
        self.with_relations(product).await
    }

    /// Delete a product, removing its stored image first (best effort).
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> Result<DeletedResponse, ServiceError> {
        let product = self.get(id).await?;

        if let Some(ref image_url) = product.image_url {
            self.delete_image_best_effort(image_url).await;
        }

        product.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;

        info!(product_id = %id, "Deleted product");
        Ok(DeletedResponse::new("Product", id))
    }

    async fn get(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {} not found", id)))
    }

    /// Deletes the object behind a stored image URL. Failures are logged
    /// and swallowed: storage cleanup must never block a row write.
    async fn delete_image_best_effort(&self, image_url: &str) {
        match object_path_from_url(image_url) {
            Some(path) => {
                if let Err(err) = self.storage.delete(&path).await {
                    warn!(%image_url, %err, "Failed to delete product image");
                }
            }
            None => {
                warn!(%image_url, "Stored image URL has no recognizable object path");
            }
        }
    }

    async fn with_relations(&self, product: product::Model) -> Result<ProductResponse, ServiceError> {
        let category = match product.category_id {
            Some(category_id) => Category::find_by_id(category_id)
                .one(&*self.db)
                .await?
                .map(|c| CategorySummary {
                    id: c.id,
                    name: c.name,
                }),
            None => None,
        };

        let supplier = match product.supplier_id {
            Some(supplier_id) => Supplier::find_by_id(supplier_id)
                .one(&*self.db)
                .await?
                .map(|s| SupplierSummary {
                    id: s.id,
                    name: s.name,
                }),
            None => None,
        };

        Ok(ProductResponse::from_model(product, category, supplier))
    }

    /// Resolves category and supplier summaries for a page of products with
    /// one query per related table instead of one per row.
    async fn with_relations_batch(
        &self,
        products: Vec<product::Model>,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let category_ids: Vec<Uuid> = products.iter().filter_map(|p| p.category_id).collect();
        let supplier_ids: Vec<Uuid> = products.iter().filter_map(|p| p.supplier_id).collect();

        let categories: std::collections::HashMap<Uuid, CategorySummary> = if category_ids
            .is_empty()
        {
            Default::default()
        } else {
            Category::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|c| (c.id, CategorySummary { id: c.id, name: c.name }))
                .collect()
        };

        let suppliers: std::collections::HashMap<Uuid, SupplierSummary> = if supplier_ids.is_empty()
        {
            Default::default()
        } else {
            Supplier::find()
                .filter(supplier::Column::Id.is_in(supplier_ids))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|s| (s.id, SupplierSummary { id: s.id, name: s.name }))
                .collect()
        };

        Ok(products
            .into_iter()
            .map(|p| {
                let category = p.category_id.and_then(|id| categories.get(&id).cloned());
                let supplier = p.supplier_id.and_then(|id| suppliers.get(&id).cloned());
                ProductResponse::from_model(p, category, supplier)
            })
            .collect())
    }

    async fn ensure_unique_sku(
        &self,
        sku: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Product::find().filter(product::Column::Sku.eq(sku));
        if let Some(id) = exclude_id {
            query = query.filter(product::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Product SKU already exists".to_string(),
            ));
        }

        Ok(())
    }

    async fn ensure_unique_barcode(
        &self,
        barcode: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Product::find().filter(product::Column::Barcode.eq(barcode));
        if let Some(id) = exclude_id {
            query = query.filter(product::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Product barcode already exists".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_amounts(price: Option<Decimal>, stock: Option<i32>) -> Result<(), ServiceError> {
    if let Some(price) = price {
        if price.is_sign_negative() {
            return Err(ServiceError::ValidationError(
                "price must not be negative".to_string(),
            ));
        }
    }
    if let Some(stock) = stock {
        if stock < 0 {
            return Err(ServiceError::ValidationError(
                "stock must not be negative".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_amounts(Some(dec!(-0.01)), None).is_err());
        assert!(validate_amounts(None, Some(-1)).is_err());
        assert!(validate_amounts(Some(dec!(0)), Some(0)).is_ok());
        assert!(validate_amounts(Some(dec!(19.99)), Some(5)).is_ok());
    }
}
