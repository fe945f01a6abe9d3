//! Shared test doubles for coordinator tests

#![allow(dead_code)]

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use suggestctl_core::{CoordinatorEvent, LookupError, SearchItem, SearchProvider, Subscription};
use tokio::sync::oneshot;

type Reply = Result<Vec<SearchItem>, LookupError>;

/// Provider whose lookups stay outstanding until the test releases them
#[derive(Default)]
pub struct GatedProvider {
    calls: Mutex<Vec<String>>,
    pending: Mutex<Vec<(String, oneshot::Sender<Reply>)>>,
}

impl GatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query the coordinator sent, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn outstanding(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Resolve the oldest outstanding lookup for `query`.
    ///
    /// Returns false if there is none, or if the lookup was already dropped.
    pub fn release(&self, query: &str, reply: Reply) -> bool {
        let gate = {
            let mut pending = self.pending.lock().unwrap();
            match pending.iter().position(|(q, _)| q == query) {
                Some(index) => pending.remove(index).1,
                None => return false,
            }
        };
        gate.send(reply).is_ok()
    }
}

#[async_trait]
impl SearchProvider for GatedProvider {
    async fn search(&self, query: &str) -> Result<Vec<SearchItem>, LookupError> {
        let (tx, rx) = oneshot::channel();
        self.calls.lock().unwrap().push(query.to_string());
        self.pending.lock().unwrap().push((query.to_string(), tx));
        rx.await
            .unwrap_or_else(|_| Err(LookupError::transport("gate dropped")))
    }
}

pub fn items(ids: &[&str]) -> Vec<SearchItem> {
    ids.iter()
        .map(|id| SearchItem::new(*id, format!("{} Corp", id)))
        .collect()
}

/// Let the coordinator and lookup tasks run until they are idle
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Drain everything already published to `sub`
pub fn drain(sub: &mut Subscription) -> Vec<CoordinatorEvent> {
    let mut events = Vec::new();
    while let Some(event) = sub.try_recv() {
        events.push(event);
    }
    events
}
