use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Events emitted after successful writes. Consumers only observe; nothing
/// in the request path depends on delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    UserCreated(Uuid),
    UserUpdated(Uuid),
    UserDeleted(Uuid),

    PostCreated(Uuid),
    PostUpdated(Uuid),
    PostDeleted(Uuid),

    CategoryCreated(Uuid),
    CategoryUpdated(Uuid),
    CategoryDeleted(Uuid),

    SupplierCreated(Uuid),
    SupplierUpdated(Uuid),
    SupplierDeleted(Uuid),

    ProductCreated(Uuid),
    ProductUpdated(Uuid),
    ProductDeleted(Uuid),
    ProductImageReplaced(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is gone.
    /// Event delivery must never fail the request that produced it.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event).await {
            warn!("Event dropped: {}", err);
        }
    }
}

/// Drains the event channel, logging each event. This is the whole consumer:
/// the system has no background jobs, so events exist for observability and
/// as the seam where integrations would attach.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        debug!(?event, "event received");
    }
    debug!("event channel closed; processor exiting");
}
