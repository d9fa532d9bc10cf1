use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Domain events emitted by the workflow services. Consumed in-process for
/// audit logging; there is no outbound delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Department events
    DepartmentCreated(Uuid),
    DepartmentDeleted(Uuid),

    // Asset events
    AssetCreated {
        asset_id: Uuid,
        asset_no: String,
    },
    AssetUpdated(Uuid),
    AssetDeleted(Uuid),

    // Request workflow events
    RequestSubmitted {
        request_id: Uuid,
        asset_id: Uuid,
        user_id: Uuid,
    },
    RequestDecided {
        request_id: Uuid,
        asset_id: Uuid,
        approved: bool,
    },
    RequestHistoryCleared {
        removed: u64,
    },

    // Stock-take events
    StockTakeOpened {
        stock_take_id: Uuid,
        department_id: Uuid,
        item_count: usize,
    },
    StockTakeStatusChanged {
        stock_take_id: Uuid,
        old_status: String,
        new_status: String,
    },
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
}

/// Background consumer draining the event channel into the audit log.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        info!(event = ?event, "domain event");
    }
    info!("Event channel closed; consumer exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn event_sender_delivers_to_channel() {
        let (tx, mut rx) = mpsc::channel(8);
        let sender = EventSender::new(tx);

        let asset_id = Uuid::new_v4();
        sender
            .send(Event::AssetCreated {
                asset_id,
                asset_no: "IT-technology-KOTDA-0001".into(),
            })
            .await
            .expect("send should succeed");

        match rx.recv().await {
            Some(Event::AssetCreated { asset_id: got, .. }) => assert_eq!(got, asset_id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn event_sender_reports_closed_channel() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender.send(Event::RequestHistoryCleared { removed: 3 }).await;
        assert!(result.is_err());
    }
}
