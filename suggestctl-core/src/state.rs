//! Suggestion list state machine
//!
//! ```text
//!            input (non-empty)             debounce fires
//!  Closed ───────────────────▶ Closed ─────────────────────▶ Loading
//!    ▲                                                         │
//!    │ failure / query cleared / dismiss / select              │ success
//!    └──────────────────────────────────────── Open ◀──────────┤ (items)
//!                                              Empty ◀─────────┘ (no items)
//! ```
//!
//! [`SuggestionMachine`] owns the [`CoordinatorState`] together with the
//! [`TicketIssuer`], so every transition and its sequence check happen under
//! one `&mut self`.

use serde::{Deserialize, Serialize};

use crate::error::{LookupError, ResolveError};
use crate::provider::SearchItem;
use crate::query::Query;
use crate::ticket::{RequestTicket, TicketIssuer};

/// Visible phase of the suggestion list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Closed,
    Loading,
    Open,
    Empty,
}

/// Snapshot of everything the rendering layer needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoordinatorState {
    pub query: Query,
    pub is_open: bool,
    pub is_loading: bool,
    pub items: Vec<SearchItem>,
    pub last_ticket: Option<RequestTicket>,
}

impl CoordinatorState {
    pub fn phase(&self) -> Phase {
        if !self.is_open {
            Phase::Closed
        } else if self.is_loading {
            Phase::Loading
        } else if self.items.is_empty() {
            Phase::Empty
        } else {
            Phase::Open
        }
    }

    fn close(&mut self) {
        self.is_open = false;
        self.is_loading = false;
        self.items.clear();
    }
}

/// What the caller should do with the debouncer after an input change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Query is long enough: (re)schedule it
    Schedule(Query),
    /// Query is empty or too short: list closed, pending firing must be cancelled
    Cleared,
}

/// Result of asking the machine to issue a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A lookup must be started for this ticket
    Started(RequestTicket),
    /// Query too short; the list was closed without contacting the provider
    Cleared,
    /// The current ticket already covers this query and is loading or shown
    Unchanged,
}

#[derive(Debug)]
pub struct SuggestionMachine {
    state: CoordinatorState,
    tickets: TicketIssuer,
    min_query_length: usize,
}

impl SuggestionMachine {
    pub fn new(min_query_length: usize) -> Self {
        Self {
            state: CoordinatorState::default(),
            tickets: TicketIssuer::new(),
            min_query_length: min_query_length.max(1),
        }
    }

    pub fn state(&self) -> &CoordinatorState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn latest_seq(&self) -> u64 {
        self.tickets.latest()
    }

    /// Record new input buffer contents.
    ///
    /// An unsearchable query closes the list right away and fences any
    /// outstanding lookup; otherwise the visible state is left alone until
    /// the debounced query is issued.
    pub fn set_input(&mut self, raw: &str) -> InputOutcome {
        let query = Query::new(raw);
        self.state.query = query.clone();

        if query.is_searchable(self.min_query_length) {
            InputOutcome::Schedule(query)
        } else {
            self.clear();
            InputOutcome::Cleared
        }
    }

    /// Issue a lookup for a debounced query
    pub fn issue(&mut self, query: Query) -> IssueOutcome {
        if !query.is_searchable(self.min_query_length) {
            self.clear();
            return IssueOutcome::Cleared;
        }

        if let Some(last) = &self.state.last_ticket {
            if last.query == query
                && self.tickets.is_current(last)
                && (self.state.is_loading || self.state.is_open)
            {
                return IssueOutcome::Unchanged;
            }
        }

        let ticket = self.tickets.issue(query);
        self.state.is_loading = true;
        self.state.is_open = true;
        self.state.last_ticket = Some(ticket.clone());
        IssueOutcome::Started(ticket)
    }

    /// Apply a lookup resolution if `ticket` is still current.
    ///
    /// Stale resolutions leave the state untouched.
    pub fn resolve(
        &mut self,
        ticket: &RequestTicket,
        result: Result<Vec<SearchItem>, LookupError>,
    ) -> Result<Phase, ResolveError> {
        self.tickets.check(ticket)?;

        match result {
            Ok(items) => {
                self.state.items = items;
                self.state.is_loading = false;
                self.state.is_open = true;
            }
            Err(_) => self.state.close(),
        }
        Ok(self.state.phase())
    }

    /// Close the list and fence every outstanding lookup.
    ///
    /// Returns whether the visible state changed.
    pub fn dismiss(&mut self) -> bool {
        let before = (self.state.is_open, self.state.is_loading);
        self.tickets.invalidate();
        self.state.close();
        before != (false, false)
    }

    /// Take the item at `index` and dismiss the list
    pub fn select(&mut self, index: usize) -> Option<SearchItem> {
        if !self.state.is_open || self.state.is_loading {
            return None;
        }
        let item = self.state.items.get(index).cloned()?;
        self.dismiss();
        Some(item)
    }

    fn clear(&mut self) {
        self.tickets.invalidate();
        self.state.close();
    }
}
