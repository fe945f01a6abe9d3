//! Request fencing
//!
//! Every lookup is tagged with a monotonically increasing sequence number.
//! Only the ticket carrying the latest issued number may touch state; all
//! others resolve into [`ResolveError::Stale`].

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;
use crate::query::Query;

/// A lookup tagged with its sequence number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTicket {
    pub seq: u64,
    pub query: Query,
}

/// Allocates sequence numbers and decides which ticket is current.
#[derive(Debug, Default)]
pub struct TicketIssuer {
    /// Highest sequence number handed out so far (0 = none yet)
    latest: u64,
}

impl TicketIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next ticket for `query`. It becomes the current ticket.
    pub fn issue(&mut self, query: Query) -> RequestTicket {
        self.latest += 1;
        RequestTicket {
            seq: self.latest,
            query,
        }
    }

    /// Burn a sequence number without issuing a lookup.
    ///
    /// Every ticket handed out before this call becomes stale. Used when the
    /// input is cleared, the list is dismissed, or the widget shuts down.
    pub fn invalidate(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }

    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.seq == self.latest
    }

    /// Check that `ticket` is still current
    pub fn check(&self, ticket: &RequestTicket) -> Result<(), ResolveError> {
        if self.is_current(ticket) {
            Ok(())
        } else {
            Err(ResolveError::Stale {
                seq: ticket.seq,
                latest: self.latest,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_monotonic() {
        let mut issuer = TicketIssuer::new();
        let a = issuer.issue(Query::new("A"));
        let b = issuer.issue(Query::new("AM"));
        assert_eq!(a.seq, 1);
        assert_eq!(b.seq, 2);
        assert!(!issuer.is_current(&a));
        assert!(issuer.is_current(&b));
    }

    #[test]
    fn test_invalidate_fences_outstanding() {
        let mut issuer = TicketIssuer::new();
        let ticket = issuer.issue(Query::new("TSLA"));
        issuer.invalidate();
        assert_eq!(
            issuer.check(&ticket),
            Err(ResolveError::Stale { seq: 1, latest: 2 })
        );

        // A ticket issued afterwards is current again
        let next = issuer.issue(Query::new("TSLA"));
        assert_eq!(next.seq, 3);
        assert!(issuer.check(&next).is_ok());
    }
}
