// src/feed/memory.rs
use crate::domain::record::CollectionRecord;
use crate::feed::sse::CollectionTree;
use crate::feed::{CollectionFeed, Delivery, FeedError, FeedEvent, Subscription};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process keyed collection with the same replay-then-push behaviour as
/// the remote stream. Clones share one collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    records: BTreeMap<String, CollectionRecord>,
    subscribers: Vec<(Delivery, Sender<FeedEvent>)>,
}

impl MemoryState {
    fn snapshot(&self) -> Vec<CollectionRecord> {
        self.records.values().cloned().collect()
    }

    fn broadcast(&mut self, event: FeedEvent) {
        self.subscribers
            .retain(|(delivery, sink)| delivery.send(sink, event.clone()));
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.broadcast(FeedEvent::Snapshot(snapshot));
    }
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = CollectionRecord>) -> Self {
        let feed = Self::new();
        {
            let mut state = feed.lock();
            for r in records {
                state.records.insert(r.id.clone(), r);
            }
        }
        feed
    }

    /// Seed from a JSON export of the collection (`{key: record, ...}`).
    pub fn from_seed_file(path: &Path) -> Result<Self, FeedError> {
        let text = fs::read_to_string(path)
            .map_err(|e| FeedError::Connect(format!("read seed {}: {e}", path.display())))?;
        let root: serde_json::Value = serde_json::from_str(&text)
            .map_err(|e| FeedError::Protocol(format!("seed {}: {e}", path.display())))?;

        let records = CollectionTree::from_value(root).records();
        log::info!("seeded {} records from {}", records.len(), path.display());
        Ok(Self::with_records(records))
    }

    pub fn upsert(&self, record: CollectionRecord) {
        let mut state = self.lock();
        state.records.insert(record.id.clone(), record);
        state.publish();
    }

    pub fn remove(&self, id: &str) {
        let mut state = self.lock();
        if state.records.remove(id).is_some() {
            state.publish();
        }
    }

    /// Replace the whole collection in one change.
    pub fn replace_all(&self, records: impl IntoIterator<Item = CollectionRecord>) {
        let mut state = self.lock();
        state.records = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        state.publish();
    }

    /// Simulate losing the connection: every subscriber gets the error and is dropped.
    pub fn fail(&self, error: FeedError) {
        let mut state = self.lock();
        state.broadcast(FeedEvent::Error(error));
        state.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        let mut state = self.lock();
        state.subscribers.retain(|(delivery, _)| delivery.is_active());
        state.subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A panic while holding the lock leaves only plain data behind.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CollectionFeed for MemoryFeed {
    fn subscribe(&self, sink: Sender<FeedEvent>) -> Subscription {
        let (subscription, delivery) = Subscription::new("memory feed");
        let mut state = self.lock();
        let snapshot = state.snapshot();
        if delivery.send(&sink, FeedEvent::Snapshot(snapshot)) {
            state.subscribers.push((delivery, sink));
        }
        subscription
    }
}
