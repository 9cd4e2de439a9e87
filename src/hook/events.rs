//! Write notifications shared by every hook of one data source.

use tokio::sync::broadcast;
use tracing::trace;

use crate::entity::Collection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// A successful mutation of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub kind: ChangeKind,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct ChangeBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish to current subscribers. Having none is not an error.
    pub fn publish(&self, collection: Collection, kind: ChangeKind, id: impl Into<String>) {
        let event = ChangeEvent {
            collection,
            kind,
            id: id.into(),
        };
        trace!(?event, "change");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = ChangeBus::default();
        let mut rx = bus.subscribe();
        bus.publish(Collection::Projects, ChangeKind::Deleted, "p-1");

        let event = rx.recv().await.unwrap();
        assert_eq!(event.collection, Collection::Projects);
        assert_eq!(event.kind, ChangeKind::Deleted);
        assert_eq!(event.id, "p-1");
    }

    #[test]
    fn test_publish_without_subscribers() {
        ChangeBus::new(0).publish(Collection::Goals, ChangeKind::Created, "g-1");
    }
}
