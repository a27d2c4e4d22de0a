use std::sync::Arc;

use axum::Router;
use tokio::sync::mpsc;

use stockroom_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    storage::InMemoryObjectStorage,
    AppState,
};

/// Test harness: application state backed by an in-memory SQLite database
/// and the in-memory object storage backend.
pub struct TestApp {
    #[allow(dead_code)]
    pub router: Router,
    pub state: Arc<AppState>,
    #[allow(dead_code)]
    pub storage: Arc<InMemoryObjectStorage>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        // A single connection keeps the in-memory database alive and shared.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");

        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let storage = Arc::new(InMemoryObjectStorage::new());
        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            storage.clone() as Arc<dyn stockroom_api::storage::ObjectStorage>,
        );

        let state = Arc::new(AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        });

        let router = Router::new()
            .nest("/api/v1", stockroom_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            storage,
            _event_task: event_task,
        }
    }

    /// Shorthand for the services container.
    #[allow(dead_code)]
    pub fn services(&self) -> &AppServices {
        &self.state.services
    }
}
