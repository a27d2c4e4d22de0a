use std::collections::HashMap;
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
    entities::{comment, post, user, Comment, Post, User},
    errors::ServiceError,
    events::{Event, EventSender},
};

use super::{DeletedResponse, ListMeta, ListResponse, PageParams};

/// Service for managing posts and surfacing their comments
#[derive(Clone)]
pub struct PostService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

/// Input for creating a post
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreatePostInput {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub author_id: Uuid,
}

/// Input for updating a post; absent fields are left untouched
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

/// Equality filters for post listings
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PostFilter {
    pub published: Option<bool>,
    pub author_id: Option<Uuid>,
}

/// Compact author row embedded in post and comment responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

impl From<user::Model> for AuthorSummary {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

/// Comment with its resolved author, embedded in post detail views
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub author: Option<AuthorSummary>,
    pub created_at: DateTime<Utc>,
}

/// Post shape returned to clients
#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub published: bool,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<AuthorSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u64>,
    /// Comments newest-first, present on detail views only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
}

impl PostResponse {
    fn from_model(model: post::Model, author: Option<AuthorSummary>) -> Self {
        Self {
            id: model.id,
            title: model.title,
            content: model.content,
            published: model.published,
            author_id: model.author_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            author,
            comment_count: None,
            comments: None,
        }
    }
}

impl PostService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Create a new post
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreatePostInput) -> Result<PostResponse, ServiceError> {
        let author = User::find_by_id(input.author_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::ValidationError(format!(
                    "Author with ID {} does not exist",
                    input.author_id
                ))
            })?;

        let post_id = Uuid::new_v4();
        let now = Utc::now();

        let model = post::ActiveModel {
            id: Set(post_id),
            title: Set(input.title),
            content: Set(input.content),
            published: Set(input.published.unwrap_or(false)),
            author_id: Set(input.author_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::PostCreated(post_id))
            .await;

        info!(post_id = %post_id, "Created post");
        Ok(PostResponse::from_model(
            created,
            Some(AuthorSummary::from(author)),
        ))
    }

    /// List posts with pagination and optional filters.
    ///
    /// Page and total are read concurrently, not in one snapshot.
    #[instrument(skip(self))]
    pub async fn find_all(
        &self,
        params: PageParams,
        filter: PostFilter,
    ) -> Result<ListResponse<PostResponse>, ServiceError> {
        let db = &*self.db;

        let mut query = Post::find();
        if let Some(published) = filter.published {
            query = query.filter(post::Column::Published.eq(published));
        }
        if let Some(author_id) = filter.author_id {
            query = query.filter(post::Column::AuthorId.eq(author_id));
        }
        let query = query.order_by_desc(post::Column::CreatedAt);

        let (rows, total) = tokio::try_join!(
            query
                .clone()
                .offset(params.skip)
                .limit(params.take)
                .all(db),
            query.clone().count(db),
        )?;

        let authors = self.load_authors(rows.iter().map(|p| p.author_id)).await?;

        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            let comment_count = self.comment_count(row.id).await?;
            let author = authors.get(&row.author_id).cloned();
            let mut response = PostResponse::from_model(row, author);
            response.comment_count = Some(comment_count);
            data.push(response);
        }

        let meta = ListMeta::new(total, params, data.len());
        Ok(ListResponse { data, meta })
    }

    /// List published posts
    pub async fn find_published(
        &self,
        params: PageParams,
    ) -> Result<ListResponse<PostResponse>, ServiceError> {
        self.find_all(
            params,
            PostFilter {
                published: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    /// List posts written by one author
    pub async fn find_by_author(
        &self,
        author_id: Uuid,
        params: PageParams,
    ) -> Result<ListResponse<PostResponse>, ServiceError> {
        self.find_all(
            params,
            PostFilter {
                author_id: Some(author_id),
                ..Default::default()
            },
        )
        .await
    }

    /// Get a post by ID with author and comments
    #[instrument(skip(self))]
    pub async fn find_one(&self, id: Uuid) -> Result<PostResponse, ServiceError> {
        let post = self.get(id).await?;

        let author = User::find_by_id(post.author_id)
            .one(&*self.db)
            .await?
            .map(AuthorSummary::from);

        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(id))
            .order_by_desc(comment::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let commenters = self.load_authors(comments.iter().map(|c| c.author_id)).await?;
        let comment_count = comments.len() as u64;
        let comments = comments
            .into_iter()
            .map(|c| CommentResponse {
                id: c.id,
                content: c.content,
                author: commenters.get(&c.author_id).cloned(),
                created_at: c.created_at,
            })
            .collect();

        let mut response = PostResponse::from_model(post, author);
        response.comment_count = Some(comment_count);
        response.comments = Some(comments);
        Ok(response)
    }

    /// Update a post
    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, input: UpdatePostInput) -> Result<PostResponse, ServiceError> {
        let current = self.get(id).await?;

        let mut active: post::ActiveModel = current.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(content) = input.content {
            active.content = Set(Some(content));
        }
        if let Some(published) = input.published {
            active.published = Set(published);
        }
        active.updated_at = Set(Utc::now());

        let post = active.update(&*self.db).await?;

        self.event_sender.send_or_log(Event::PostUpdated(id)).await;

        info!(post_id = %id, "Updated post");
        let author = User::find_by_id(post.author_id)
            .one(&*self.db)
            .await?
            .map(AuthorSummary::from);
        Ok(PostResponse::from_model(post, author))
    }

    /// Mark a post as published
    pub async fn publish(&self, id: Uuid) -> Result<PostResponse, ServiceError> {
        self.update(
            id,
            UpdatePostInput {
                published: Some(true),
                ..Default::default()
            },
        )
        .await
    }

    /// Mark a post as unpublished
    pub async fn unpublish(&self, id: Uuid) -> Result<PostResponse, ServiceError> {
        self.update(
            id,
            UpdatePostInput {
                published: Some(false),
                ..Default::default()
            },
        )
        .await
    }

    /// Delete a post
    #[instrument(skip(self))]
    pub async fn remove(&self, id: Uuid) -> Result<DeletedResponse, ServiceError> {
        let post = self.get(id).await?;

        post.delete(&*self.db).await?;

        self.event_sender.send_or_log(Event::PostDeleted(id)).await;

        info!(post_id = %id, "Deleted post");
        Ok(DeletedResponse::new("Post", id))
    }

    async fn get(&self, id: Uuid) -> Result<post::Model, ServiceError> {
        Post::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Post with ID {} not found", id)))
    }

    async fn comment_count(&self, post_id: Uuid) -> Result<u64, ServiceError> {
        Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&*self.db)
            .await
            .map_err(Into::into)
    }

    /// Loads author summaries for a set of user ids with a single query
    async fn load_authors(
        &self,
        ids: impl Iterator<Item = Uuid>,
    ) -> Result<HashMap<Uuid, AuthorSummary>, ServiceError> {
        let ids: Vec<Uuid> = ids.collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        Ok(User::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, AuthorSummary::from(u)))
            .collect())
    }
}
