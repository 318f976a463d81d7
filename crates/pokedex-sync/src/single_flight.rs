//! # Single-Flight Tracking
//!
//! Ensures at most one fetch per key is in flight.
//!
//! ```text
//! claim(25) ──► Leader(Ticket)  ── fetch + persist ──► ticket.land()
//! claim(25) ──► Follower(Waiter) ─────── wait() ─────────────┘ Ok(())
//! ```
//!
//! The check-and-mark happens under one lock, so two concurrent claims for
//! the same key can never both become leaders. A ticket dropped without
//! landing releases its key and fails its waiters, so a later claim retries.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

/// What waiters of a flight observe. Errors are carried as messages since
/// the leader's error is not cloneable.
pub type FlightOutcome = Result<(), String>;

const ABANDONED: &str = "fetch abandoned before completion";

type OutcomeSender = Arc<watch::Sender<Option<FlightOutcome>>>;

struct Flight {
    id: u64,
    tx: OutcomeSender,
}

struct Inner<K> {
    flights: HashMap<K, Flight>,
    next_id: u64,
}

/// Set of keys with a fetch in flight.
///
/// Cloning shares the set.
pub struct SingleFlight<K> {
    inner: Arc<Mutex<Inner<K>>>,
}

impl<K> Clone for SingleFlight<K> {
    fn clone(&self) -> Self {
        SingleFlight {
            inner: self.inner.clone(),
        }
    }
}

impl<K: Eq + Hash + Clone> Default for SingleFlight<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of [`SingleFlight::claim`].
pub enum Claim<K: Eq + Hash> {
    /// No fetch was running; the caller now owns it.
    Leader(Ticket<K>),
    /// Another caller owns the fetch.
    Follower(Waiter),
}

impl<K: Eq + Hash + Clone> SingleFlight<K> {
    pub fn new() -> Self {
        SingleFlight {
            inner: Arc::new(Mutex::new(Inner {
                flights: HashMap::new(),
                next_id: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<K>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `key` as in flight, or joins the flight already running.
    pub fn claim(&self, key: K) -> Claim<K> {
        let mut inner = self.lock();

        if let Some(flight) = inner.flights.get(&key) {
            return Claim::Follower(Waiter {
                rx: flight.tx.subscribe(),
            });
        }

        inner.next_id += 1;
        let id = inner.next_id;
        let (tx, _) = watch::channel(None);
        let tx = Arc::new(tx);
        inner.flights.insert(
            key.clone(),
            Flight {
                id,
                tx: tx.clone(),
            },
        );

        Claim::Leader(Ticket {
            key,
            id,
            tx,
            inner: self.inner.clone(),
            finished: false,
        })
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.lock().flights.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every key. Running flights still deliver to their waiters,
    /// but new claims for the same keys start fresh flights.
    pub fn clear(&self) {
        self.lock().flights.clear();
    }
}

/// Ownership of one flight. Finishing or dropping it releases the key.
pub struct Ticket<K: Eq + Hash> {
    key: K,
    id: u64,
    tx: OutcomeSender,
    inner: Arc<Mutex<Inner<K>>>,
    finished: bool,
}

impl<K: Eq + Hash> Ticket<K> {
    /// Completes the flight successfully.
    pub fn land(mut self) {
        self.finish(Ok(()));
    }

    /// Completes the flight with a failure shared by every waiter.
    pub fn fail(mut self, message: impl Into<String>) {
        self.finish(Err(message.into()));
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    fn finish(&mut self, outcome: FlightOutcome) {
        if self.finished {
            return;
        }
        self.finished = true;

        {
            let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            // The set may have been cleared and the key claimed again.
            if inner.flights.get(&self.key).map(|f| f.id) == Some(self.id) {
                inner.flights.remove(&self.key);
            }
        }

        self.tx.send_replace(Some(outcome));
    }
}

impl<K: Eq + Hash> Drop for Ticket<K> {
    fn drop(&mut self) {
        self.finish(Err(ABANDONED.to_string()));
    }
}

/// Handle on a flight owned by someone else.
pub struct Waiter {
    rx: watch::Receiver<Option<FlightOutcome>>,
}

impl Waiter {
    /// Waits for the leader to finish.
    pub async fn wait(mut self) -> FlightOutcome {
        loop {
            if let Some(outcome) = self.rx.borrow_and_update().clone() {
                return outcome;
            }
            if self.rx.changed().await.is_err() {
                return self
                    .rx
                    .borrow()
                    .clone()
                    .unwrap_or_else(|| Err(ABANDONED.to_string()));
            }
        }
    }
}
