use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity - account identity plus the optional HR profile
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Login email, unique across all users
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash, never serialized into responses
    #[serde(skip_serializing)]
    pub password: String,

    pub role: Role,
    pub is_active: bool,

    #[sea_orm(nullable)]
    pub name: Option<String>,

    // Personal information
    #[sea_orm(nullable)]
    pub employee_type: Option<String>,
    #[sea_orm(nullable)]
    pub national_id: Option<String>,
    #[sea_orm(nullable)]
    pub title_th: Option<String>,
    #[sea_orm(nullable)]
    pub first_name_th: Option<String>,
    #[sea_orm(nullable)]
    pub last_name_th: Option<String>,
    #[sea_orm(nullable)]
    pub first_name_en: Option<String>,
    #[sea_orm(nullable)]
    pub last_name_en: Option<String>,
    #[sea_orm(nullable)]
    pub nickname: Option<String>,
    #[sea_orm(nullable)]
    pub gender: Option<String>,
    #[sea_orm(nullable)]
    pub blood_type: Option<String>,
    #[sea_orm(nullable)]
    pub birth_date: Option<DateTime<Utc>>,
    #[sea_orm(nullable)]
    pub ethnicity: Option<String>,
    #[sea_orm(nullable)]
    pub nationality: Option<String>,
    #[sea_orm(nullable)]
    pub religion: Option<String>,
    #[sea_orm(nullable)]
    pub phone: Option<String>,
    #[sea_orm(nullable)]
    pub province: Option<String>,
    #[sea_orm(nullable)]
    pub marital_status: Option<String>,

    // Employment information
    #[sea_orm(nullable)]
    pub username: Option<String>,
    #[sea_orm(nullable)]
    pub employee_id: Option<String>,
    #[sea_orm(nullable)]
    pub position: Option<String>,
    #[sea_orm(nullable)]
    pub position_level: Option<String>,
    #[sea_orm(nullable)]
    pub department: Option<String>,
    #[sea_orm(nullable)]
    pub employment_status: Option<String>,
    #[sea_orm(nullable)]
    pub start_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Posts,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// User role enumeration
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
    Default,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
pub enum Role {
    #[sea_orm(string_value = "USER")]
    #[serde(rename = "USER")]
    #[default]
    User,
    #[sea_orm(string_value = "ADMIN")]
    #[serde(rename = "ADMIN")]
    Admin,
}
