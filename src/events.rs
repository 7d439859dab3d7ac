use serde::Serialize;
use tokio::sync::broadcast;

/// A "some record changed" signal for downstream consumers (the UI refresh
/// path subscribes via the /events SSE feed).
#[derive(Debug, Clone, Serialize)]
pub struct ChangeEvent {
    pub table: &'static str,
    pub op: &'static str,
    pub id: String,
}

/// Change-notification hook of the store. Lossy by design: slow subscribers
/// miss events rather than backpressure the pipeline.
#[derive(Clone)]
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn publish(&self, table: &'static str, op: &'static str, id: impl ToString) {
        // send fails only when nobody listens, which is fine
        let _ = self.tx.send(ChangeEvent {
            table,
            op,
            id: id.to_string(),
        });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
