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
    entities::{product, supplier, Product, Supplier},
    errors::{conflict_on_unique, ServiceError},
    events::{Event, EventSender},
};

use super::{DeletedResponse, ListMeta, ListResponse, PageParams, ProductSummary};

/// Number of recent products embedded in a supplier detail view
const DETAIL_PRODUCT_LIMIT: u64 = 10;

/// Service for managing suppliers
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Input for creating a supplier
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Input for updating a supplier; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Equality filters for supplier listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SupplierFilter {
    pub is_active: Option<bool>,
}

/// Supplier shape returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct SupplierResponse {
    pub id: Uuid,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_count: u64,
    /// Most recent products, present on detail views only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductSummary>>,
}

impl SupplierResponse {
    fn from_model(
        model: supplier::Model,
        product_count: u64,
        products: Option<Vec<ProductSummary>>,
    ) -> Self {
        Self {
            id: model.id,
            name: model.name,
            contact_person: model.contact_person,
            phone: model.phone,
            email: model.email,
            address: model.address,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            product_count,
            products,
        }
    }
}

impl SupplierService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create a new supplier
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateSupplierInput) -> Result<SupplierResponse, ServiceError> {
        self.ensure_unique_name(&input.name, None).await?;

        let supplier_id = Uuid::new_v4();
        let now = Utc::now();

        let supplier = supplier::ActiveModel {
            id: Set(supplier_id),
            name: Set(input.name),
            contact_person: Set(input.contact_person),
            phone: Set(input.phone),
            email: Set(input.email),
            address: Set(input.address),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let supplier = supplier
            .insert(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Supplier name already exists"))?;

        self.event_sender
            .send_or_log(Event::SupplierCreated(supplier_id))
            .await;

        info!("Created supplier: {}", supplier_id);
        Ok(SupplierResponse::from_model(supplier, 0, None))
    }

    /// List suppliers with pagination and optional filters.
    ///
    /// Page and total are read concurrently, not in one snapshot.
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        params: PageParams,
        filter: SupplierFilter,
    ) -> Result<ListResponse<SupplierResponse>, ServiceError> {
        let db = &*self.db;

        let mut query = Supplier::find();
        if let Some(is_active) = filter.is_active {
            query = query.filter(supplier::Column::IsActive.eq(is_active));
        }
        let query = query.order_by_desc(supplier::Column::CreatedAt);

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
            data.push(SupplierResponse::from_model(row, product_count, None));
        }

        let meta = ListMeta::new(total, params, data.len());
        Ok(ListResponse { data, meta })
    }

    /// Get a supplier by ID with its most recent products
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> Result<SupplierResponse, ServiceError> {
        let supplier = self.get(id).await?;

        let product_count = self.product_count(id).await?;
        let products = Product::find()
            .filter(product::Column::SupplierId.eq(id))
            .order_by_desc(product::Column::CreatedAt)
            .limit(DETAIL_PRODUCT_LIMIT)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(ProductSummary::from)
            .collect();

        Ok(SupplierResponse::from_model(
            supplier,
            product_count,
            Some(products),
        ))
    }

    /// Update a supplier
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSupplierInput,
    ) -> Result<SupplierResponse, ServiceError> {
        let current = self.get(id).await?;

        if let Some(ref name) = input.name {
            if *name != current.name {
                self.ensure_unique_name(name, Some(id)).await?;
            }
        }

        let mut active: supplier::ActiveModel = current.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(contact_person) = input.contact_person {
            active.contact_person = Set(Some(contact_person));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = input.email {
            active.email = Set(Some(email));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let supplier = active
            .update(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Supplier name already exists"))?;

        self.event_sender
            .send_or_log(Event::SupplierUpdated(id))
            .await;

        info!("Updated supplier: {}", id);
        let product_count = self.product_count(id).await?;
        Ok(SupplierResponse::from_model(supplier, product_count, None))
    }

    /// Delete a supplier
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> Result<DeletedResponse, ServiceError> {
        let supplier = self.get(id).await?;

        supplier.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::SupplierDeleted(id))
            .await;

        info!("Deleted supplier: {}", id);
        Ok(DeletedResponse::new("Supplier", id))
    }

    async fn get(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        Supplier::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Supplier with ID {} not found", id)))
    }

    async fn product_count(&self, supplier_id: Uuid) -> Result<u64, ServiceError> {
        Product::find()
            .filter(product::Column::SupplierId.eq(supplier_id))
            .count(&*self.db)
            .await
            .map_err(Into::into)
    }

    async fn ensure_unique_name(
        &self,
        name: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Supplier::find().filter(supplier::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            query = query.filter(supplier::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict(
                "Supplier name already exists".to_string(),
            ));
        }

        Ok(())
    }
}
