use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the core services after their transaction commits.
///
/// Consumers (notification dispatch, webhooks, projections) subscribe via the
/// receiving half of the channel; the core never depends on them succeeding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SaleOrderStatusChanged {
        sale_order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    PurchaseOrderCascaded {
        purchase_order_id: Uuid,
        status: String,
        units_touched: u64,
    },
    AdjustmentApplied {
        adjustment_id: Uuid,
        reference: String,
    },
    AdjustmentReversed {
        adjustment_id: Uuid,
    },
    PreorderAssigned {
        reservation_id: Uuid,
        product_id: Uuid,
        user_id: Uuid,
    },
    UnitsReleased {
        product_id: Uuid,
        count: u64,
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

    /// Sends an event, surfacing the failure to the caller.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event on a best-effort path. Failures are logged, never
    /// raised, so a full or closed channel cannot fail the triggering
    /// transaction.
    pub async fn send_best_effort(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!("Dropping event {:?}: {}", event, e);
        }
    }
}

/// Creates a bounded event channel and its sender handle.
pub fn event_channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Drains events, logging each one. Suitable as a default consumer for
/// binaries and tests that do not wire a real dispatcher.
pub async fn log_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!("event: {:?}", event);
    }
}
