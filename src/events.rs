use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Domain events emitted after committed state changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    InboundRecorded {
        movement_id: i64,
        lot_id: i64,
        warehouse_id: i64,
        unit_id: i64,
        quantity: Decimal,
        new_on_hand: Decimal,
    },
    OutboundRecorded {
        movement_id: i64,
        lot_id: i64,
        warehouse_id: i64,
        unit_id: i64,
        quantity: Decimal,
        new_on_hand: Decimal,
        consumed_allocation_id: Option<i64>,
    },
    AllocationCreated {
        allocation_id: i64,
        lot_id: i64,
        warehouse_id: i64,
        unit_id: i64,
        quantity: Decimal,
    },
    AllocationUpdated {
        allocation_id: i64,
        quantity: Decimal,
    },
    AllocationReleased {
        allocation_id: i64,
    },
    MonthlyRollupCompleted {
        month: NaiveDate,
        row_count: u64,
    },
}

/// Cloneable handle for emitting events from services.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event. Delivery is best-effort; the database transaction is
    /// the source of truth and a full or closed channel must not fail the
    /// operation that produced the event.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("failed to send event: {e}"))
    }
}

/// Creates a connected sender/receiver pair with a bounded buffer.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}

/// Drains the event channel, logging each event. Runs until all senders drop.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    info!("event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::InboundRecorded {
                movement_id,
                quantity,
                new_on_hand,
                ..
            } => {
                info!(movement_id, %quantity, %new_on_hand, "inbound movement recorded");
            }
            Event::OutboundRecorded {
                movement_id,
                quantity,
                new_on_hand,
                consumed_allocation_id,
                ..
            } => {
                info!(
                    movement_id,
                    %quantity,
                    %new_on_hand,
                    ?consumed_allocation_id,
                    "outbound movement recorded"
                );
            }
            Event::AllocationCreated {
                allocation_id,
                quantity,
                ..
            } => {
                info!(allocation_id, %quantity, "allocation created");
            }
            Event::AllocationUpdated {
                allocation_id,
                quantity,
            } => {
                info!(allocation_id, %quantity, "allocation updated");
            }
            Event::AllocationReleased { allocation_id } => {
                info!(allocation_id, "allocation released");
            }
            Event::MonthlyRollupCompleted { month, row_count } => {
                info!(%month, row_count, "monthly rollup completed");
            }
        }
        debug!(?event, "event processed");
    }
    info!("event processor stopped");
}
