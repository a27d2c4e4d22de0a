use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    entities::{category, product, Category, Product},
    errors::{conflict_on_unique, ServiceError},
    events::{Event, EventSender},
};

use super::{DeletedResponse, ListMeta, ListResponse, PageParams, ProductSummary};

/// Number of recent products embedded in a category detail view
const DETAIL_PRODUCT_LIMIT: u64 = 10;

/// Service for managing product categories
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Input for creating a category
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for updating a category; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCategoryInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Equality filters for category listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct CategoryFilter {
    pub is_active: Option<bool>,
}

/// Category shape returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_count: u64,
    /// Most recent products, present on detail views only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductSummary>>,
}

impl CategoryResponse {
    fn from_model(
        model: category::Model,
        product_count: u64,
        products: Option<Vec<ProductSummary>>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            product_count,
            products,
        }
    }
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create a new category
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateCategoryInput) -> Result<CategoryResponse, ServiceError> {
        self.ensure_unique_name(&input.name, None).await?;

        let category_id = Uuid::new_v4();
        let now = Utc::now();

        let category = category::ActiveModel {
            id: Set(category_id),
            name: Set(input.name),
            description: Set(input.description),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let category = category
            .insert(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Category name already exists"))?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(category_id))
            .await;

        info!("Created category: {}", category_id);
        Ok(CategoryResponse::from_model(category, 0, None))
    }

    /// List categories with pagination and optional filters.
    ///
    /// The page and the total count are fetched concurrently rather than in
    /// one snapshot, so `total` can be momentarily stale under concurrent
    /// writes. Good enough for an admin listing.
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        params: PageParams,
        filter: CategoryFilter,
    ) -> Result<ListResponse<CategoryResponse>, ServiceError> {
        let db = &*self.db;

        let mut query = Category::find();
        if let Some(is_active) = filter.is_active {
            query = query.filter(category::Column::IsActive.eq(is_active));
        }
        let query = query.order_by_desc(category::Column::CreatedAt);

        let (rows, total) = tokio::try_join!(
            query
                .clone()
                .offset(params.skip)
                .limit(params.take)
                .all(db),
            query.clone().count(db),
        )?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let product_count = self.product_count(row.id).await?;
            data.push(CategoryResponse::from_model(row, product_count, None));
        }

        let meta = ListMeta::new(total, params, data.len());
        Ok(ListResponse { data, meta })
    }

    /// Get a category by ID with its most recent products
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> Result<CategoryResponse, ServiceError> {
        let category = self.get(id).await?;

        let product_count = self.product_count(id).await?;
        let products = Product::find()
            .filter(product::Column::CategoryId.eq(id))
            .order_by_desc(product::Column::CreatedAt)
            .limit(DETAIL_PRODUCT_LIMIT)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(ProductSummary::from)
            .collect();

        Ok(CategoryResponse::from_model(
            category,
            product_count,
            Some(products),
        ))
    }

    /// Update a category
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateCategoryInput,
    ) -> Result<CategoryResponse, ServiceError> {
        let current = self.get(id).await?;

        // Re-check uniqueness only when the name actually changes;
        // renaming a category to its own name is always allowed.
        if let Some(ref name) = input.name {
            if *name != current.name {
                self.ensure_unique_name(name, Some(id)).await?;
            }
        }

        let mut active: category::ActiveModel = current.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let category = active
            .update(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Category name already exists"))?;

        self.event_sender
            .send_or_log(Event::CategoryUpdated(id))
            .await;

        info!("Updated category: {}", id);
        let product_count = self.product_count(id).await?;
        Ok(CategoryResponse::from_model(category, product_count, None))
    }

    /// Delete a category
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> Result<DeletedResponse, ServiceError> {
        let category = self.get(id).await?;

        category.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryDeleted(id))
            .await;

        info!("Deleted category: {}", id);
        Ok(DeletedResponse::new("Category", id))
    }

    async fn get(&self, id: Uuid) -> Result<category::Model, ServiceError> {
        Category::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Category with ID {} not found", id)))
    }

    async fn product_count(&self, category_id: Uuid) -> Result<u64, ServiceError> {
        Product::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(&*self.db)
            .await
            .map_err(Into::into)
    }

    async fn ensure_unique_name(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Category::find().filter(category::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(category::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Category name already exists".to_string(),
            ));
        }

        Ok(())
    }
}
