//! suggestctl-core - incremental (type-ahead) search coordination
//!
//! ```text
//! keystroke → Debouncer → TicketIssuer (seq n) → SearchProvider::search
//!                                                    │
//!              CoordinatorState ◀── SuggestionMachine::resolve (only if n is latest)
//! ```

pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod error;
pub mod events;
pub mod provider;
pub mod query;
pub mod state;
pub mod ticket;

pub use config::{CoordinatorConfig, SearchConfig, SuggestConfig};
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use debounce::Debouncer;
pub use error::{ConfigError, CoordinatorError, LookupError, ResolveError};
pub use events::{CoordinatorEvent, Subscription};
pub use provider::{search_with_deadline, SearchItem, SearchProvider};
pub use query::Query;
pub use state::{CoordinatorState, InputOutcome, IssueOutcome, Phase, SuggestionMachine};
pub use ticket::{RequestTicket, TicketIssuer};
