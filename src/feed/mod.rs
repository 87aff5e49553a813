//! Push-based view over the remote collection of collection-event records.
//!
//! A feed delivers the whole collection on subscribe and again after every
//! change. Failures travel down the same channel as snapshots.

mod feed_error;
pub mod firebase;
pub mod memory;
pub mod sse;

pub use feed_error::FeedError;
pub use firebase::FirebaseFeed;
pub use memory::MemoryFeed;

use crate::domain::record::CollectionRecord;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Snapshot(Vec<CollectionRecord>),
    Error(FeedError),
}

pub trait CollectionFeed {
    /// Register `sink` and schedule one delivery of the current collection,
    /// followed by one per change, until the returned subscription is released.
    fn subscribe(&self, sink: Sender<FeedEvent>) -> Subscription;
}

/// Handle for one live registration. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    active: Arc<AtomicBool>,
    label: String,
}

impl Subscription {
    pub(crate) fn new(label: impl Into<String>) -> (Self, Delivery) {
        let active = Arc::new(AtomicBool::new(true));
        let sub = Self {
            active: active.clone(),
            label: label.into(),
        };
        (sub, Delivery { active })
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Stop deliveries. Safe to call any number of times.
    pub fn unsubscribe(&mut self) {
        if self.active.swap(false, Ordering::SeqCst) {
            log::info!("unsubscribed from {}", self.label);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Producer side of a subscription: knows whether anyone still listens.
#[derive(Debug, Clone)]
pub(crate) struct Delivery {
    active: Arc<AtomicBool>,
}

impl Delivery {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns false once the subscription is gone or the receiver hung up.
    pub fn send(&self, sink: &Sender<FeedEvent>, event: FeedEvent) -> bool {
        if !self.is_active() {
            return false;
        }
        if sink.send(event).is_err() {
            self.active.store(false, Ordering::SeqCst);
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn unsubscribe_is_idempotent_and_stops_delivery() {
        let (tx, rx) = mpsc::channel();
        let (mut sub, delivery) = Subscription::new("test");

        assert!(delivery.send(&tx, FeedEvent::Snapshot(vec![])));
        sub.unsubscribe();
        sub.unsubscribe();

        assert!(!sub.is_active());
        assert!(!delivery.send(&tx, FeedEvent::Snapshot(vec![])));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn dropping_the_handle_releases_it() {
        let (tx, rx) = mpsc::channel();
        let (sub, delivery) = Subscription::new("test");
        drop(sub);
        assert!(!delivery.send(&tx, FeedEvent::Error(FeedError::Closed)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn hung_up_receiver_deactivates_delivery() {
        let (tx, rx) = mpsc::channel();
        let (sub, delivery) = Subscription::new("test");
        drop(rx);
        assert!(!delivery.send(&tx, FeedEvent::Snapshot(vec![])));
        assert!(!sub.is_active());
    }
}
