use crate::entities::relief_request::RequestStatus;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events published after a transaction commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ReservationCreated {
        reservation_id: Uuid,
        inventory_id: Uuid,
        package_id: Uuid,
        quantity: i64,
    },
    ReservationResized {
        reservation_id: Uuid,
        inventory_id: Uuid,
        old_quantity: i64,
        new_quantity: i64,
    },
    ReservationReleased {
        reservation_id: Uuid,
        inventory_id: Uuid,
        quantity: i64,
    },
    ReservationConsumed {
        reservation_id: Uuid,
        inventory_id: Uuid,
        quantity: i64,
    },
    StockReceived {
        inventory_id: Uuid,
        quantity: i64,
    },
    StockWrittenOff {
        inventory_id: Uuid,
        defective: i64,
        expired: i64,
    },
    /// Usable stock fell to or below the item's reorder quantity.
    ReorderThresholdReached {
        inventory_id: Uuid,
        item_id: Uuid,
        usable: i64,
        reorder_qty: i64,
    },
    PackageCreated(Uuid),
    PackageVerified(Uuid),
    PackageDispatched {
        package_id: Uuid,
        dispatched_at: DateTime<Utc>,
        lines: usize,
    },
    PackageCancelled {
        package_id: Uuid,
        released_lines: usize,
    },
    DisasterEventOpened(Uuid),
    DisasterEventClosed(Uuid),
    RequestCreated {
        request_id: Uuid,
        agency_id: Uuid,
        lines: usize,
    },
    RequestStatusChanged {
        request_id: Uuid,
        from: RequestStatus,
        to: RequestStatus,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::ReservationCreated { .. } => "reservation_created",
            Event::ReservationResized { .. } => "reservation_resized",
            Event::ReservationReleased { .. } => "reservation_released",
            Event::ReservationConsumed { .. } => "reservation_consumed",
            Event::StockReceived { .. } => "stock_received",
            Event::StockWrittenOff { .. } => "stock_written_off",
            Event::ReorderThresholdReached { .. } => "reorder_threshold_reached",
            Event::PackageCreated(_) => "package_created",
            Event::PackageVerified(_) => "package_verified",
            Event::PackageDispatched { .. } => "package_dispatched",
            Event::PackageCancelled { .. } => "package_cancelled",
            Event::DisasterEventOpened(_) => "disaster_event_opened",
            Event::DisasterEventClosed(_) => "disaster_event_closed",
            Event::RequestCreated { .. } => "request_created",
            Event::RequestStatusChanged { .. } => "request_status_changed",
        }
    }
}

#[derive(Debug, Error)]
#[error("Failed to send event: {0}")]
pub struct EventError(String);

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), EventError> {
        self.sender
            .send(event)
            .await
            .map_err(|e| EventError(e.to_string()))
    }

    /// Publishes committed changes. The data is already durable, so a closed
    /// channel is logged rather than reported to the caller.
    pub async fn publish_all(&self, events: Vec<Event>) {
        for event in events {
            let name = event.name();
            if let Err(e) = self.send(event).await {
                warn!(event = name, error = %e, "Dropping domain event");
            }
        }
    }
}

/// Consumes domain events until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        counter!("drims.events.processed", 1, "event" => event.name());
        match &event {
            Event::ReorderThresholdReached {
                inventory_id,
                item_id,
                usable,
                reorder_qty,
            } => {
                warn!(
                    inventory_id = %inventory_id,
                    item_id = %item_id,
                    usable,
                    reorder_qty,
                    "Stock at or below reorder quantity"
                );
            }
            other => {
                info!(event = other.name(), payload = ?other, "Domain event");
            }
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_all_delivers_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);
        let id = Uuid::new_v4();

        sender
            .publish_all(vec![
                Event::PackageCreated(id),
                Event::PackageVerified(id),
            ])
            .await;

        assert_eq!(rx.recv().await, Some(Event::PackageCreated(id)));
        assert_eq!(rx.recv().await, Some(Event::PackageVerified(id)));
    }

    #[tokio::test]
    async fn closed_channel_does_not_fail_publish() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);
        assert!(sender.send(Event::PackageCreated(Uuid::new_v4())).await.is_err());
        sender
            .publish_all(vec![Event::PackageCreated(Uuid::new_v4())])
            .await;
    }
}
