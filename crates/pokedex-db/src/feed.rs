//! # Live Feeds
//!
//! "Subscribe to the current value, receive updates on change" over the
//! store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Repository write ──commit──► ChangeNotifier::notify()  (revision += 1) │
//! │                                      │                                  │
//! │                        watch::Receiver<u64> (one per feed)              │
//! │                                      │                                  │
//! │  Feed::next() ◄── changed() ─────────┘                                  │
//! │       │                                                                 │
//! │       └── re-runs its query and returns a fresh snapshot                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Notification happens only after a write has committed, so a snapshot
//! never observes part of a batch. Rapid writes may coalesce into one
//! wake-up; the snapshot taken afterwards always reflects the latest state.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::DbResult;

// =============================================================================
// Change Notifier
// =============================================================================

/// Revision counter bumped after every committed write to one table.
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: Arc<watch::Sender<u64>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        ChangeNotifier { tx: Arc::new(tx) }
    }

    /// Signals that the table changed.
    pub fn notify(&self) {
        self.tx.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Number of writes signalled so far.
    pub fn revision(&self) -> u64 {
        *self.tx.borrow()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Feed
// =============================================================================

/// Query re-run by a [`Feed`] whenever its sources change.
#[async_trait]
pub trait FeedQuery: Send + Sync {
    type Item: Send;

    async fn fetch(&self) -> DbResult<Self::Item>;
}

/// A live view of one query.
///
/// ## Usage
/// ```rust,ignore
/// let mut teams = db.teams().watch_all();
/// render(teams.current().await?);
/// while let Some(snapshot) = teams.next().await {
///     render(snapshot?);
/// }
/// ```
pub struct Feed<Q: FeedQuery> {
    query: Q,
    primary: watch::Receiver<u64>,
    related: Option<watch::Receiver<u64>>,
}

impl<Q: FeedQuery> Feed<Q> {
    pub(crate) fn new(query: Q, primary: watch::Receiver<u64>) -> Self {
        Feed {
            query,
            primary,
            related: None,
        }
    }

    /// Also re-emit when a second table changes (e.g. species names shown
    /// inside teams).
    pub(crate) fn with_related(mut self, related: watch::Receiver<u64>) -> Self {
        self.related = Some(related);
        self
    }

    /// Returns the latest snapshot and marks all pending changes as seen.
    pub async fn current(&mut self) -> DbResult<Q::Item> {
        let _ = self.primary.borrow_and_update();
        if let Some(related) = self.related.as_mut() {
            let _ = related.borrow_and_update();
        }
        self.query.fetch().await
    }

    /// Waits for the next committed change and returns the snapshot after it.
    ///
    /// Returns `None` once the change source has been dropped.
    pub async fn next(&mut self) -> Option<DbResult<Q::Item>> {
        let changed = match self.related.as_mut() {
            Some(related) => tokio::select! {
                res = self.primary.changed() => res,
                res = related.changed() => res,
            },
            None => self.primary.changed().await,
        };

        if changed.is_err() {
            return None;
        }
        Some(self.current().await)
    }
}
