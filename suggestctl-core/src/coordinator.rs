//! Incremental search coordinator
//!
//! A single tokio task owns the [`SuggestionMachine`], the [`Debouncer`] and
//! every in-flight lookup. Hosts talk to it through a [`CoordinatorHandle`]:
//!
//! ```text
//! handle.input() ──▶ command channel ──▶ Debouncer ──(quiet period)──▶ issue ticket
//!                                                                        │
//!   watch / broadcast ◀── publish ◀── resolve (sequence check) ◀── JoinSet lookup
//! ```
//!
//! Lookups that lose the sequence race are left to finish and dropped on
//! arrival. Shutting down aborts whatever is still in flight.

use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::debounce::Debouncer;
use crate::error::{CoordinatorError, LookupError, ResolveError};
use crate::events::{CoordinatorEvent, Subscription};
use crate::provider::{search_with_deadline, SearchItem, SearchProvider};
use crate::state::{CoordinatorState, InputOutcome, IssueOutcome, SuggestionMachine};
use crate::ticket::RequestTicket;

/// Buffered events per subscriber before it starts skipping
const EVENT_CAPACITY: usize = 64;

type Resolution = (RequestTicket, Result<Vec<SearchItem>, LookupError>);

enum Command {
    Input(String),
    Dismiss,
    Select {
        index: usize,
        reply: oneshot::Sender<Option<SearchItem>>,
    },
    Subscribe {
        reply: oneshot::Sender<Subscription>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Cloneable handle to a running coordinator.
///
/// The coordinator stops when [`CoordinatorHandle::shutdown`] is called or
/// when the last handle is dropped.
#[derive(Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<CoordinatorState>,
}

impl CoordinatorHandle {
    /// Replace the input buffer contents (one call per keystroke)
    pub fn input(&self, text: impl Into<String>) -> Result<(), CoordinatorError> {
        self.send(Command::Input(text.into()))
    }

    /// External dismissal (click outside, focus lost)
    pub fn dismiss(&self) -> Result<(), CoordinatorError> {
        self.send(Command::Dismiss)
    }

    /// Choose the item at `index` in the visible list.
    ///
    /// Returns the chosen item, or `None` when no list is shown or the index
    /// is out of range. Selection dismisses the list.
    pub async fn select(&self, index: usize) -> Result<Option<SearchItem>, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Select { index, reply })?;
        rx.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Subscribe to coordinator events
    pub async fn subscribe(&self) -> Result<Subscription, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Subscribe { reply })?;
        rx.await.map_err(|_| CoordinatorError::Closed)
    }

    /// Latest published state
    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state
    pub fn watch(&self) -> watch::Receiver<CoordinatorState> {
        self.state.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Stop the coordinator and wait until it has torn down.
    ///
    /// Pending debounce and in-flight lookups are dropped; no state is
    /// published afterwards. Calling this on a closed coordinator is a no-op.
    pub async fn shutdown(&self) {
        let (done, rx) = oneshot::channel();
        if self.send(Command::Shutdown { done }).is_ok() {
            let _ = rx.await;
        }
    }

    fn send(&self, command: Command) -> Result<(), CoordinatorError> {
        self.commands
            .send(command)
            .map_err(|_| CoordinatorError::Closed)
    }
}

/// The actor owning all coordinator state
pub struct Coordinator {
    provider: Arc<dyn SearchProvider>,
    machine: SuggestionMachine,
    debouncer: Debouncer,
    lookup_timeout: Option<Duration>,
    lookups: JoinSet<Resolution>,
    commands: mpsc::UnboundedReceiver<Command>,
    state_tx: watch::Sender<CoordinatorState>,
    events: broadcast::Sender<CoordinatorEvent>,
}

impl Coordinator {
    /// Spawn a coordinator on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn(provider: Arc<dyn SearchProvider>, config: &CoordinatorConfig) -> CoordinatorHandle {
        let (commands_tx, commands) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(CoordinatorState::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let coordinator = Coordinator {
            provider,
            machine: SuggestionMachine::new(config.min_query_length),
            debouncer: Debouncer::new(config.debounce()),
            lookup_timeout: config.lookup_timeout(),
            lookups: JoinSet::new(),
            commands,
            state_tx,
            events,
        };

        debug!(
            debounce_ms = config.debounce_ms,
            min_query_length = config.min_query_length,
            "coordinator started"
        );
        tokio::spawn(coordinator.run());

        CoordinatorHandle {
            commands: commands_tx,
            state: state_rx,
        }
    }

    async fn run(mut self) {
        loop {
            let deadline = self.debouncer.deadline();

            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(command) => {
                        if self.handle(command).is_break() {
                            return;
                        }
                    }
                    None => break,
                },

                Some(joined) = self.lookups.join_next(), if !self.lookups.is_empty() => {
                    self.on_lookup_joined(joined);
                }

                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.fire_debounce();
                }
            }
        }

        self.teardown();
    }

    fn handle(&mut self, command: Command) -> ControlFlow<()> {
        match command {
            Command::Input(raw) => match self.machine.set_input(&raw) {
                InputOutcome::Schedule(query) => {
                    debug!(query = %query, "debounce scheduled");
                    self.debouncer.schedule(query, Instant::now());
                }
                InputOutcome::Cleared => {
                    if let Some(query) = self.debouncer.cancel() {
                        debug!(query = %query, "pending query dropped, input cleared");
                    }
                }
            },
            Command::Dismiss => {
                self.debouncer.cancel();
                if self.machine.dismiss() {
                    debug!("suggestion list dismissed");
                }
            }
            Command::Select { index, reply } => {
                let chosen = self.machine.select(index);
                if let Some(item) = &chosen {
                    self.debouncer.cancel();
                    info!(id = %item.id, "item selected");
                    self.emit(CoordinatorEvent::Selected { item: item.clone() });
                }
                let _ = reply.send(chosen);
            }
            Command::Subscribe { reply } => {
                let _ = reply.send(Subscription::new(self.events.subscribe()));
            }
            Command::Shutdown { done } => {
                self.teardown();
                let _ = done.send(());
                return ControlFlow::Break(());
            }
        }
        self.publish();
        ControlFlow::Continue(())
    }

    fn fire_debounce(&mut self) {
        let Some(query) = self.debouncer.take_due(Instant::now()) else {
            return;
        };

        match self.machine.issue(query) {
            IssueOutcome::Started(ticket) => self.start_lookup(ticket),
            IssueOutcome::Unchanged => debug!("debounced query already current"),
            IssueOutcome::Cleared => {}
        }
        self.publish();
    }

    fn start_lookup(&mut self, ticket: RequestTicket) {
        info!(seq = ticket.seq, query = %ticket.query, "issuing lookup");
        self.emit(CoordinatorEvent::LookupIssued {
            seq: ticket.seq,
            query: ticket.query.clone(),
        });

        let provider = Arc::clone(&self.provider);
        let deadline = self.lookup_timeout;
        self.lookups.spawn(async move {
            let lookup = search_with_deadline(provider.as_ref(), ticket.query.as_str(), deadline);
            let result = AssertUnwindSafe(lookup)
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(LookupError::unavailable("search provider panicked")));
            (ticket, result)
        });
    }

    fn on_lookup_joined(&mut self, joined: Result<Resolution, JoinError>) {
        let (ticket, result) = match joined {
            Ok(resolution) => resolution,
            Err(err) => {
                debug!(error = %err, "lookup task ended without resolving");
                return;
            }
        };

        let failure = result.as_ref().err().map(ToString::to_string);
        let count = result.as_ref().map(Vec::len).unwrap_or(0);

        match self.machine.resolve(&ticket, result) {
            Ok(phase) => {
                match failure {
                    Some(reason) => {
                        warn!(seq = ticket.seq, query = %ticket.query, %reason, "lookup failed");
                        self.emit(CoordinatorEvent::LookupFailed {
                            seq: ticket.seq,
                            reason,
                        });
                    }
                    None => {
                        info!(seq = ticket.seq, items = count, phase = ?phase, "lookup resolved");
                    }
                }
                self.publish();
            }
            Err(ResolveError::Stale { seq, latest }) => {
                debug!(seq, latest, "discarding stale response");
                self.emit(CoordinatorEvent::LookupDiscarded { seq, latest });
            }
        }
    }

    /// Publish the machine state if it differs from the last published one
    fn publish(&self) {
        let state = self.machine.state();
        if *self.state_tx.borrow() == *state {
            return;
        }
        self.state_tx.send_replace(state.clone());
        self.emit(CoordinatorEvent::state_changed(state));
    }

    fn emit(&self, event: CoordinatorEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn teardown(&mut self) {
        self.commands.close();
        self.debouncer.cancel();
        self.machine.dismiss();
        let in_flight = self.lookups.len();
        self.lookups.abort_all();
        debug!(in_flight, "coordinator shut down");
    }
}
