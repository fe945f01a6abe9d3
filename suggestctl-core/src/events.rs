use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::provider::SearchItem;
use crate::query::Query;
use crate::state::{CoordinatorState, Phase};

/// Events published by the coordinator to its observers
///
/// Serialized as one JSON object per event, tagged by `event`, so the
/// terminal driver can print them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CoordinatorEvent {
    /// Visible state changed (onStateChange)
    StateChanged {
        phase: Phase,
        state: CoordinatorState,
    },

    /// Host picked an item from the list (onSelect)
    Selected { item: SearchItem },

    /// A lookup was sent to the search provider
    LookupIssued { seq: u64, query: Query },

    /// A superseded lookup resolved and was dropped
    LookupDiscarded { seq: u64, latest: u64 },

    /// The current lookup failed; the list was closed
    LookupFailed { seq: u64, reason: String },
}

impl CoordinatorEvent {
    pub fn state_changed(state: &CoordinatorState) -> Self {
        CoordinatorEvent::StateChanged {
            phase: state.phase(),
            state: state.clone(),
        }
    }

    /// Sequence number the event refers to, for lookup events
    pub fn seq(&self) -> Option<u64> {
        match self {
            CoordinatorEvent::LookupIssued { seq, .. } => Some(*seq),
            CoordinatorEvent::LookupDiscarded { seq, .. } => Some(*seq),
            CoordinatorEvent::LookupFailed { seq, .. } => Some(*seq),
            CoordinatorEvent::StateChanged { .. } | CoordinatorEvent::Selected { .. } => None,
        }
    }

    /// Whether a rendering layer needs to act on this event
    pub fn is_visible(&self) -> bool {
        matches!(
            self,
            CoordinatorEvent::StateChanged { .. } | CoordinatorEvent::Selected { .. }
        )
    }
}

/// Live subscription to coordinator events.
///
/// Dropping the subscription unsubscribes; no callback outlives it.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<CoordinatorEvent>,
}

impl Subscription {
    pub(crate) fn new(rx: broadcast::Receiver<CoordinatorEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the coordinator has shut down. A subscriber that
    /// falls behind skips the events it missed.
    pub async fn recv(&mut self) -> Option<CoordinatorEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber lagged behind coordinator events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take an already-published event without waiting
    pub fn try_recv(&mut self) -> Option<CoordinatorEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
