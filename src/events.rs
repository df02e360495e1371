use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted by the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    OrderUpdated(Uuid),
    OrderCancelled(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    TaskCreated {
        task_id: Uuid,
        order_id: Uuid,
    },
    TaskStatusChanged {
        task_id: Uuid,
        old_status: String,
        new_status: String,
    },
    TaskAssigned {
        task_id: Uuid,
        employee_id: Uuid,
    },
    PurchaseOrderStatusChanged {
        purchase_order_id: Uuid,
        old_status: String,
        new_status: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously. Callers log and continue on failure;
    /// event delivery never fails a request.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel and logs each event. Notification delivery
/// mechanics live outside this service; this loop is the in-process sink.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => {
                info!(%order_id, %old_status, %new_status, "order status changed");
            }
            Event::TaskAssigned { task_id, employee_id } => {
                info!(%task_id, %employee_id, "task assigned");
            }
            other => info!(event = ?other, "event processed"),
        }
    }
    warn!("event channel closed; processor exiting");
}
