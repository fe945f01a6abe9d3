//! Terminal rendering of coordinator events

use anyhow::Result;
use suggestctl_core::{CoordinatorEvent, CoordinatorState, Phase};
use suggestctl_search::OutputFormat;

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Closed => "closed",
        Phase::Loading => "loading",
        Phase::Open => "open",
        Phase::Empty => "empty",
    }
}

/// Render a state snapshot as text: a header line plus one line per item
pub fn format_state(state: &CoordinatorState) -> String {
    let mut out = format!("[{}] \"{}\"", phase_label(state.phase()), state.query);
    if let Some(ticket) = &state.last_ticket {
        out.push_str(&format!(" #{}", ticket.seq));
    }
    out.push('\n');
    for (index, item) in state.items.iter().enumerate() {
        out.push_str(&format!("  {}. {}  {}\n", index, item.id, item.label));
    }
    out
}

/// Render an event for the terminal, or `None` for bookkeeping events
pub fn render_event(event: &CoordinatorEvent, format: OutputFormat) -> Result<Option<String>> {
    if !event.is_visible() {
        return Ok(None);
    }

    let rendered = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string(event)?),
        OutputFormat::Text => match event {
            CoordinatorEvent::StateChanged { state, .. } => format_state(state),
            CoordinatorEvent::Selected { item } => {
                format!("selected {}  {}\n", item.id, item.label)
            }
            _ => return Ok(None),
        },
    };
    Ok(Some(rendered))
}
