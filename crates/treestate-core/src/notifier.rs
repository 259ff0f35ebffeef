//! Status broadcast to subscribers.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::status::WorkingTreeStatus;

/// One `status-changed` emission: a fresh snapshot, or an error envelope
/// when a background refresh failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum StatusEvent {
    Status { status: WorkingTreeStatus },
    Error { message: String },
}

/// Fan-out of [`StatusEvent`]s to any number of subscribers.
///
/// Fire-and-forget: no acknowledgement, no backpressure. A subscriber that
/// falls behind loses the oldest buffered events; only the newest status
/// matters, so last-write-wins delivery is the contract, not a compromise.
#[derive(Debug, Clone)]
pub struct StatusNotifier {
    tx: broadcast::Sender<StatusEvent>,
}

impl StatusNotifier {
    /// Notifier with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a subscriber. Events emitted before this call are not
    /// replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.tx.subscribe()
    }

    /// Broadcast an event. Emitting with zero subscribers is a no-op.
    pub fn emit(&self, event: StatusEvent) {
        let _ = self.tx.send(event);
    }
}
