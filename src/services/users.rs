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
    auth::PasswordHasher,
    entities::{comment, post, user, user::Role, Comment, Post, User},
    errors::{conflict_on_unique, ServiceError},
    events::{Event, EventSender},
};

use super::{parse_date_input, DeletedResponse, ListMeta, ListResponse, PageParams};

/// Number of recent posts embedded in a user detail view
const DETAIL_POST_LIMIT: u64 = 5;

/// Service for managing user accounts and their HR profile
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    hasher: PasswordHasher,
}

/// Input for creating a user
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateUserInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub name: Option<String>,

    // Personal information
    pub employee_type: Option<String>,
    pub national_id: Option<String>,
    pub title_th: Option<String>,
    pub first_name_th: Option<String>,
    pub last_name_th: Option<String>,
    pub first_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    /// ISO 8601 date or datetime
    pub birth_date: Option<String>,
    pub ethnicity: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub marital_status: Option<String>,

    // Employment information
    pub username: Option<String>,
    pub employee_id: Option<String>,
    pub position: Option<String>,
    pub position_level: Option<String>,
    pub department: Option<String>,
    pub employment_status: Option<String>,
    /// ISO 8601 date or datetime
    pub start_date: Option<String>,
}

/// Input for updating a user; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUserInput {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub name: Option<String>,

    pub employee_type: Option<String>,
    pub national_id: Option<String>,
    pub title_th: Option<String>,
    pub first_name_th: Option<String>,
    pub last_name_th: Option<String>,
    pub first_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    /// ISO 8601 date or datetime
    pub birth_date: Option<String>,
    pub ethnicity: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub marital_status: Option<String>,

    pub username: Option<String>,
    pub employee_id: Option<String>,
    pub position: Option<String>,
    pub position_level: Option<String>,
    pub department: Option<String>,
    pub employment_status: Option<String>,
    /// ISO 8601 date or datetime
    pub start_date: Option<String>,
}

/// Equality filters for user listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct UserFilter {
    pub is_active: Option<bool>,
    pub role: Option<Role>,
}

/// Compact post row embedded in a user detail view
#[derive(Debug, Serialize, ToSchema)]
pub struct UserPostSummary {
    pub id: Uuid,
    pub title: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// User shape returned to clients. The password hash never appears here.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub name: Option<String>,

    pub employee_type: Option<String>,
    pub national_id: Option<String>,
    pub title_th: Option<String>,
    pub first_name_th: Option<String>,
    pub last_name_th: Option<String>,
    pub first_name_en: Option<String>,
    pub last_name_en: Option<String>,
    pub nickname: Option<String>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    pub birth_date: Option<DateTime<Utc>>,
    pub ethnicity: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub phone: Option<String>,
    pub province: Option<String>,
    pub marital_status: Option<String>,

    pub username: Option<String>,
    pub employee_id: Option<String>,
    pub position: Option<String>,
    pub position_level: Option<String>,
    pub department: Option<String>,
    pub employment_status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
    /// Most recent posts, present on detail views only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<UserPostSummary>>,
}

impl From<user::Model> for UserResponse {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            role: model.role,
            is_active: model.is_active,
            name: model.name,
            employee_type: model.employee_type,
            national_id: model.national_id,
            title_th: model.title_th,
            first_name_th: model.first_name_th,
            last_name_th: model.last_name_th,
            first_name_en: model.first_name_en,
            last_name_en: model.last_name_en,
            nickname: model.nickname,
            gender: model.gender,
            blood_type: model.blood_type,
            birth_date: model.birth_date,
            ethnicity: model.ethnicity,
            nationality: model.nationality,
            religion: model.religion,
            phone: model.phone,
            province: model.province,
            marital_status: model.marital_status,
            username: model.username,
            employee_id: model.employee_id,
            position: model.position,
            position_level: model.position_level,
            department: model.department,
            employment_status: model.employment_status,
            start_date: model.start_date,
            created_at: model.created_at,
            updated_at: model.updated_at,
            post_count: None,
            comment_count: None,
            posts: None,
        }
    }
}

impl UserResponse {
    fn with_counts(mut self, post_count: u64, comment_count: u64) -> Self {
        self.post_count = Some(post_count);
        self.comment_count = Some(comment_count);
        self
    }
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db,
            event_sender,
            hasher: PasswordHasher::new(),
        }
    }

    /// Create a new user with a hashed password
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: CreateUserInput) -> Result<UserResponse, ServiceError> {
        self.ensure_unique_email(&input.email, None).await?;

        let password_hash = self.hasher.hash_password(&input.password)?;
        let birth_date = input
            .birth_date
            .as_deref()
            .map(|raw| parse_date_input("birth_date", raw))
            .transpose()?;
        let start_date = input
            .start_date
            .as_deref()
            .map(|raw| parse_date_input("start_date", raw))
            .transpose()?;

        let user_id = Uuid::new_v4();
        let now = Utc::now();

        let model = user::ActiveModel {
            id: Set(user_id),
            email: Set(input.email),
            password: Set(password_hash),
            role: Set(input.role.unwrap_or_default()),
            is_active: Set(input.is_active.unwrap_or(true)),
            name: Set(input.name),
            employee_type: Set(input.employee_type),
            national_id: Set(input.national_id),
            title_th: Set(input.title_th),
            first_name_th: Set(input.first_name_th),
            last_name_th: Set(input.last_name_th),
            first_name_en: Set(input.first_name_en),
            last_name_en: Set(input.last_name_en),
            nickname: Set(input.nickname),
            gender: Set(input.gender),
            blood_type: Set(input.blood_type),
            birth_date: Set(birth_date),
            ethnicity: Set(input.ethnicity),
            nationality: Set(input.nationality),
            religion: Set(input.religion),
            phone: Set(input.phone),
            province: Set(input.province),
            marital_status: Set(input.marital_status),
            username: Set(input.username),
            employee_id: Set(input.employee_id),
            position: Set(input.position),
            position_level: Set(input.position_level),
            department: Set(input.department),
            employment_status: Set(input.employment_status),
            start_date: Set(start_date),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = model
            .insert(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already exists"))?;

        self.event_sender
            .send_or_log(Event::UserCreated(user_id))
            .await;

        info!(user_id = %user_id, "Created user");
        Ok(UserResponse::from(user))
    }

    /// List users with pagination and optional filters.
    ///
    /// Page and total are read concurrently, not in one snapshot.
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        params: PageParams,
        filter: UserFilter,
    ) -> Result<ListResponse<UserResponse>, ServiceError> {
        let db = &*self.db;

        let mut query = User::find();
        if let Some(is_active) = filter.is_active {
            query = query.filter(user::Column::IsActive.eq(is_active));
        }
        if let Some(role) = filter.role {
            query = query.filter(user::Column::Role.eq(role));
        }
        let query = query.order_by_desc(user::Column::CreatedAt);

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
            let (post_count, comment_count) = self.record_counts(row.id).await?;
            data.push(UserResponse::from(row).with_counts(post_count, comment_count));
        }

        let meta = ListMeta::new(total, params, data.len());
        Ok(ListResponse { data, meta })
    }

    /// Get a user by ID with record counts and their most recent posts
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> Result<UserResponse, ServiceError> {
        let user = self.get(id).await?;

        let (post_count, comment_count) = self.record_counts(id).await?;
        let posts = Post::find()
            .filter(post::Column::AuthorId.eq(id))
            .order_by_desc(post::Column::CreatedAt)
            .limit(DETAIL_POST_LIMIT)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|p| UserPostSummary {
                id: p.id,
                title: p.title,
                published: p.published,
                created_at: p.created_at,
            })
            .collect();

        let mut response = UserResponse::from(user).with_counts(post_count, comment_count);
        response.posts = Some(posts);
        Ok(response)
    }

    /// Update a user, re-hashing the password when a new one is supplied
    #[instrument(skip(self, input))]
    pub async fn update(&self, id: Uuid, input: UpdateUserInput) -> Result<UserResponse, ServiceError> {
        let current = self.get(id).await?;

        // Uniqueness is re-checked only when the email actually changes;
        // updating a user to their own email is always allowed.
        if let Some(ref email) = input.email {
            if *email != current.email {
                self.ensure_unique_email(email, Some(id)).await?;
            }
        }

        let birth_date = input
            .birth_date
            .as_deref()
            .map(|raw| parse_date_input("birth_date", raw))
            .transpose()?;
        let start_date = input
            .start_date
            .as_deref()
            .map(|raw| parse_date_input("start_date", raw))
            .transpose()?;

        let mut active: user::ActiveModel = current.into();
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(password) = input.password {
            active.password = Set(self.hasher.hash_password(&password)?);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(name) = input.name {
            active.name = Set(Some(name));
        }
        if let Some(employee_type) = input.employee_type {
            active.employee_type = Set(Some(employee_type));
        }
        if let Some(national_id) = input.national_id {
            active.national_id = Set(Some(national_id));
        }
        if let Some(title_th) = input.title_th {
            active.title_th = Set(Some(title_th));
        }
        if let Some(first_name_th) = input.first_name_th {
            active.first_name_th = Set(Some(first_name_th));
        }
        if let Some(last_name_th) = input.last_name_th {
            active.last_name_th = Set(Some(last_name_th));
        }
        if let Some(first_name_en) = input.first_name_en {
            active.first_name_en = Set(Some(first_name_en));
        }
        if let Some(last_name_en) = input.last_name_en {
            active.last_name_en = Set(Some(last_name_en));
        }
        if let Some(nickname) = input.nickname {
            active.nickname = Set(Some(nickname));
        }
        if let Some(gender) = input.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(blood_type) = input.blood_type {
            active.blood_type = Set(Some(blood_type));
        }
        if let Some(birth_date) = birth_date {
            active.birth_date = Set(Some(birth_date));
        }
        if let Some(ethnicity) = input.ethnicity {
            active.ethnicity = Set(Some(ethnicity));
        }
        if let Some(nationality) = input.nationality {
            active.nationality = Set(Some(nationality));
        }
        if let Some(religion) = input.religion {
            active.religion = Set(Some(religion));
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(province) = input.province {
            active.province = Set(Some(province));
        }
        if let Some(marital_status) = input.marital_status {
            active.marital_status = Set(Some(marital_status));
        }
        if let Some(username) = input.username {
            active.username = Set(Some(username));
        }
        if let Some(employee_id) = input.employee_id {
            active.employee_id = Set(Some(employee_id));
        }
        if let Some(position) = input.position {
            active.position = Set(Some(position));
        }
        if let Some(position_level) = input.position_level {
            active.position_level = Set(Some(position_level));
        }
        if let Some(department) = input.department {
            active.department = Set(Some(department));
        }
        if let Some(employment_status) = input.employment_status {
            active.employment_status = Set(Some(employment_status));
        }
        if let Some(start_date) = start_date {
            active.start_date = Set(Some(start_date));
        }
        active.updated_at = Set(Utc::now());

        let user = active
            .update(&*self.db)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already exists"))?;

        self.event_sender.send_or_log(Event::UserUpdated(id)).await;

        info!(user_id = %id, "Updated user");
        Ok(UserResponse::from(user))
    }

    /// Delete a user
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> Result<DeletedResponse, ServiceError> {
        let user = self.get(id).await?;

        user.delete(&*self.db).await?;

        self.event_sender.send_or_log(Event::UserDeleted(id)).await;

        info!(user_id = %id, "Deleted user");
        Ok(DeletedResponse::new("User", id))
    }

    async fn get(&self, id: Uuid) -> Result<user::Model, ServiceError> {
        User::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User with ID {} not found", id)))
    }

    async fn record_counts(&self, user_id: Uuid) -> Result<(u64, u64), ServiceError> {
        let posts = Post::find()
            .filter(post::Column::AuthorId.eq(user_id))
            .count(&*self.db)
            .await?;
        let comments = Comment::find()
            .filter(comment::Column::AuthorId.eq(user_id))
            .count(&*self.db)
            .await?;
        Ok((posts, comments))
    }

    async fn ensure_unique_email(
        &self,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = User::find().filter(user::Column::Email.eq(email));
        if let Some(id) = exclude_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::Conflict("Email already exists".to_string()));
        }

        Ok(())
    }
}
