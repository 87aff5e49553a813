// src/history/session.rs
use crate::domain::record::CollectionRecord;
use crate::feed::{CollectionFeed, FeedError, FeedEvent, Subscription};
use crate::history::projection::{Projection, Tab};
use chrono::{Local, NaiveDateTime};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send>;

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// State owned by one open history screen: its subscription, the latest
/// snapshot, the selected tab and the projection derived from them.
///
/// The projection is recomputed from scratch whenever the snapshot or tab
/// changes and replaced wholesale.
pub struct HistorySession {
    subscription: Option<Subscription>,
    events: Receiver<FeedEvent>,
    snapshot: Vec<CollectionRecord>,
    tab: Tab,
    projection: Projection,
    last_error: Option<FeedError>,
    clock: Clock,
}

impl HistorySession {
    /// Mount: subscribe and start with an empty `Today` projection until the
    /// first snapshot is pumped in.
    pub fn open(feed: &dyn CollectionFeed) -> Self {
        Self::open_with_clock(feed, Box::new(local_now))
    }

    pub fn open_with_clock(feed: &dyn CollectionFeed, clock: Clock) -> Self {
        let (tx, rx) = mpsc::channel();
        let subscription = feed.subscribe(tx);
        let tab = Tab::default();
        let now = clock();

        Self {
            subscription: Some(subscription),
            events: rx,
            snapshot: Vec::new(),
            tab,
            projection: Projection::empty(tab, now),
            last_error: None,
            clock,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .map(Subscription::is_active)
            .unwrap_or(false)
    }

    /// Drain everything the feed queued since the last call. Only the newest
    /// snapshot is projected; older queued ones are dropped unseen.
    ///
    /// Returns whether the projection was replaced, or the feed error if the
    /// subscription was lost (the subscription is released in that case).
    pub fn pump(&mut self) -> Result<bool, FeedError> {
        if !self.is_subscribed() {
            self.discard_pending();
            return Ok(false);
        }

        let pending: Vec<FeedEvent> = self.events.try_iter().collect();
        self.absorb(pending)
    }

    /// Like `pump`, but blocks up to `timeout` for the first event.
    pub fn wait_for_update(&mut self, timeout: Duration) -> Result<bool, FeedError> {
        if !self.is_subscribed() {
            self.discard_pending();
            return Ok(false);
        }

        let first = match self.events.recv_timeout(timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) => return Ok(false),
            Err(RecvTimeoutError::Disconnected) => FeedEvent::Error(FeedError::Closed),
        };

        let mut pending = vec![first];
        pending.extend(self.events.try_iter());
        self.absorb(pending)
    }

    fn absorb(&mut self, pending: Vec<FeedEvent>) -> Result<bool, FeedError> {
        let mut latest = None;
        let mut error = None;
        let mut skipped = 0usize;

        for event in pending {
            match event {
                FeedEvent::Snapshot(records) => {
                    if latest.replace(records).is_some() {
                        skipped += 1;
                    }
                }
                FeedEvent::Error(e) => error = Some(e),
            }
        }

        if skipped > 0 {
            log::debug!("superseded {skipped} queued snapshots");
        }

        let changed = match latest {
            Some(records) => {
                self.snapshot = records;
                self.recompute();
                true
            }
            None => false,
        };

        if let Some(e) = error {
            log::error!("history feed lost: {e}");
            if let Some(sub) = self.subscription.as_mut() {
                sub.unsubscribe();
            }
            self.last_error = Some(e.clone());
            return Err(e);
        }

        if changed {
            self.last_error = None;
        }
        Ok(changed)
    }

    pub fn select_tab(&mut self, tab: Tab) -> &Projection {
        self.tab = tab;
        self.recompute();
        &self.projection
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn snapshot_len(&self) -> usize {
        self.snapshot.len()
    }

    /// Look up one record of the latest snapshot (report-view handoff).
    pub fn record(&self, id: &str) -> Option<&CollectionRecord> {
        self.snapshot.iter().find(|r| r.id == id)
    }

    pub fn last_error(&self) -> Option<&FeedError> {
        self.last_error.as_ref()
    }

    /// Release the current subscription (if any) and open a new one.
    /// Retrying after a feed error is the caller's decision.
    pub fn resubscribe(&mut self, feed: &dyn CollectionFeed) {
        self.close();
        let (tx, rx) = mpsc::channel();
        self.events = rx;
        self.subscription = Some(feed.subscribe(tx));
        self.last_error = None;
    }

    /// Unmount: release the subscription and drop anything still queued.
    pub fn close(&mut self) {
        if let Some(mut sub) = self.subscription.take() {
            sub.unsubscribe();
        }
        self.discard_pending();
    }

    fn discard_pending(&mut self) {
        let dropped = self.events.try_iter().count();
        if dropped > 0 {
            log::debug!("discarded {dropped} events after unsubscribe");
        }
    }

    fn recompute(&mut self) {
        let now = (self.clock)();
        self.projection = Projection::compute(&self.snapshot, self.tab, now);
        log::debug!(
            "projected {} of {} records for {} ({} undated)",
            self.projection.len(),
            self.snapshot.len(),
            self.tab,
            self.projection.undated
        );
    }
}

impl Drop for HistorySession {
    fn drop(&mut self) {
        self.close();
    }
}
