pub mod categories;
pub mod common;
pub mod health;
pub mod posts;
pub mod products;
pub mod suppliers;
pub mod users;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;
use crate::services::{CategoryService, PostService, ProductService, SupplierService, UserService};
use crate::storage::ObjectStorage;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<UserService>,
    pub posts: Arc<PostService>,
    pub categories: Arc<CategoryService>,
    pub suppliers: Arc<SupplierService>,
    pub products: Arc<ProductService>,
}

impl AppServices {
    /// Build the services container. Every service receives its
    /// collaborators explicitly; nothing is resolved from globals.
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            users: Arc::new(UserService::new(db.clone(), event_sender.clone())),
            posts: Arc::new(PostService::new(db.clone(), event_sender.clone())),
            categories: Arc::new(CategoryService::new(db.clone(), event_sender.clone())),
            suppliers: Arc::new(SupplierService::new(db.clone(), event_sender.clone())),
            products: Arc::new(ProductService::new(db, event_sender, storage)),
        }
    }
}
