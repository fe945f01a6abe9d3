use std::time::Duration;

use proptest::prelude::*;
use suggestctl_core::{
    Debouncer, IssueOutcome, LookupError, Phase, Query, RequestTicket, SearchItem,
    SuggestionMachine,
};
use tokio::time::Instant;

const DEBOUNCE_MS: u64 = 250;

fn results_for(query: &str) -> Vec<SearchItem> {
    vec![SearchItem::new(query, format!("{} holdings", query))]
}

#[derive(Debug, Clone)]
enum Op {
    Input(String),
    FireDebounce,
    Resolve { index: usize, ok: bool },
    Dismiss,
}

fn arb_input() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        "[A-Z]{1,5}",
        " [A-Z]{1,4} ",
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        arb_input().prop_map(Op::Input),
        Just(Op::FireDebounce),
        (0usize..8, any::<bool>()).prop_map(|(index, ok)| Op::Resolve { index, ok }),
        Just(Op::Dismiss),
    ]
}

proptest! {
    /// Property: exactly one dispatch per settled quiet window, carrying the last query
    #[test]
    fn prop_one_dispatch_per_quiet_window(
        inputs in prop::collection::vec(
            ("[A-Z]{1,4}", prop_oneof![0u64..DEBOUNCE_MS, (DEBOUNCE_MS + 1)..600]),
            1..30,
        )
    ) {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(DEBOUNCE_MS));
        let mut now = start;
        let mut fired = Vec::new();

        for (query, gap) in &inputs {
            debouncer.schedule(Query::new(query), now);
            now += Duration::from_millis(*gap);
            if let Some(q) = debouncer.take_due(now) {
                fired.push(q.as_str().to_string());
            }
        }
        if let Some(q) = debouncer.take_due(now + Duration::from_millis(DEBOUNCE_MS)) {
            fired.push(q.as_str().to_string());
        }

        // A query fires iff the next input arrived after its quiet period
        let mut expected = Vec::new();
        for (i, (query, gap)) in inputs.iter().enumerate() {
            let last = i + 1 == inputs.len();
            if last || *gap > DEBOUNCE_MS {
                expected.push(query.clone());
            }
        }
        prop_assert_eq!(fired, expected);
    }

    /// Property: whatever order tickets resolve in, only the latest one lands
    #[test]
    fn prop_only_latest_ticket_applies(
        order in (1usize..8).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    ) {
        let mut machine = SuggestionMachine::new(1);
        let tickets: Vec<RequestTicket> = (0..order.len())
            .map(|i| match machine.issue(Query::new(&format!("Q{}", i))) {
                IssueOutcome::Started(ticket) => ticket,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        let latest = tickets.len() - 1;

        for &index in &order {
            let before = machine.state().clone();
            let ticket = &tickets[index];
            let outcome = machine.resolve(ticket, Ok(results_for(ticket.query.as_str())));
            if index == latest {
                prop_assert!(outcome.is_ok());
            } else {
                prop_assert!(outcome.is_err());
                prop_assert_eq!(machine.state(), &before);
            }
        }

        let expected = results_for(&format!("Q{}", latest));
        prop_assert_eq!(&machine.state().items, &expected);
        prop_assert_eq!(machine.phase(), Phase::Open);
    }

    /// Property: state invariants hold after any sequence of host and network events
    #[test]
    fn prop_state_invariants(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut machine = SuggestionMachine::new(1);
        let mut pending_query: Option<Query> = None;
        let mut issued: Vec<RequestTicket> = Vec::new();

        for op in ops {
            match op {
                Op::Input(raw) => {
                    if let suggestctl_core::InputOutcome::Schedule(q) = machine.set_input(&raw) {
                        pending_query = Some(q);
                    } else {
                        pending_query = None;
                    }
                }
                Op::FireDebounce => {
                    if let Some(q) = pending_query.take() {
                        if let IssueOutcome::Started(ticket) = machine.issue(q) {
                            issued.push(ticket);
                        }
                    }
                }
                Op::Resolve { index, ok } => {
                    if let Some(ticket) = issued.get(index).cloned() {
                        let result = if ok {
                            Ok(results_for(ticket.query.as_str()))
                        } else {
                            Err(LookupError::transport("offline"))
                        };
                        let _ = machine.resolve(&ticket, result);
                    }
                }
                Op::Dismiss => {
                    pending_query = None;
                    machine.dismiss();
                }
            }

            let state = machine.state();
            if state.query.is_empty() {
                prop_assert!(!state.is_open);
                prop_assert!(state.items.is_empty());
            }
            if state.is_loading {
                prop_assert!(state.is_open);
                let current = state.last_ticket.as_ref().map(|t| t.seq);
                prop_assert_eq!(current, Some(machine.latest_seq()));
            }
            if !state.is_open {
                prop_assert!(state.items.is_empty());
            }
        }
    }
}
