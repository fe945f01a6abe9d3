//! Debounce scheduling
//!
//! The debouncer only records *when* the pending query is due. The
//! coordinator loop sleeps until [`Debouncer::deadline`] and then calls
//! [`Debouncer::take_due`], so the scheduler itself never spawns or blocks.

use std::time::Duration;

use tokio::time::Instant;

use crate::query::Query;

/// Default quiet period before a query is dispatched
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

#[derive(Debug)]
struct Pending {
    query: Query,
    due: Instant,
}

/// Coalesces rapid input into a single dispatch after a quiet period
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `query`, replacing any pending firing and restarting the
    /// quiet period from `now`.
    pub fn schedule(&mut self, query: Query, now: Instant) {
        let due = now + self.delay;
        if let Some(previous) = self.pending.replace(Pending { query, due }) {
            tracing::trace!(superseded = %previous.query, "debounce reset");
        }
    }

    /// Drop the pending firing, if any
    pub fn cancel(&mut self) -> Option<Query> {
        self.pending.take().map(|p| p.query)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending query fires, if one is scheduled
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.due)
    }

    /// Take the pending query if its quiet period has elapsed at `now`
    pub fn take_due(&mut self, now: Instant) -> Option<Query> {
        match &self.pending {
            Some(p) if p.due <= now => self.pending.take().map(|p| p.query),
            _ => None,
        }
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}
