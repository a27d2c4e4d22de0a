use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product entity
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Product name
    pub name: String,

    /// Product description
    #[sea_orm(nullable)]
    pub description: Option<String>,

    /// Selling price, never negative
    pub price: Decimal,

    /// Units on hand, never negative
    pub stock: i32,

    /// SKU (Stock Keeping Unit), unique across all products
    #[sea_orm(unique)]
    pub sku: String,

    /// Barcode or UPC, unique when present
    #[sea_orm(unique, nullable)]
    pub barcode: Option<String>,

    /// Weight in the unit of measure below
    #[sea_orm(nullable)]
    pub weight: Option<Decimal>,

    /// Unit of measure (e.g. "kg", "pcs")
    #[sea_orm(nullable)]
    pub unit: Option<String>,

    #[sea_orm(nullable)]
    pub expiry_date: Option<DateTime<Utc>>,

    /// Public URL of the stored product image, owned by object storage
    #[sea_orm(nullable)]
    pub image_url: Option<String>,

    pub is_active: bool,

    #[sea_orm(nullable)]
    pub category_id: Option<Uuid>,
    #[sea_orm(nullable)]
    pub supplier_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.is_active {
                active_model.is_active = Set(true);
            }
        }

        active_model.updated_at = Set(Utc::now());

        Ok(active_model)
    }
}
