//! Enumerable transition table
//!
//! Mirrors every edge `transition` can take. Served as-is by the server's
//! `/flow` endpoint.

use serde::Serialize;

/// One edge of the flow graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: &'static str,
    pub trigger: &'static str,
    pub to: &'static str,
}

const fn edge(from: &'static str, trigger: &'static str, to: &'static str) -> Edge {
    Edge { from, trigger, to }
}

pub const TRANSITIONS: &[Edge] = &[
    edge("idle", "greeting keyword", "greeting"),
    edge("session_closed", "greeting keyword", "greeting"),
    edge("greeting", "menu option 2 / agendar / cita", "specialty_selection"),
    edge("greeting", "menu option 1 / especialidades", "browsing_catalog"),
    edge("greeting", "greeting keyword", "greeting"),
    edge("greeting", "unrecognized reply", "greeting"),
    edge("greeting", "idle timeout", "session_closed"),
    edge("browsing_catalog", "catalog fetched", "greeting"),
    edge("browsing_catalog", "catalog unavailable or empty", "greeting"),
    edge("specialty_selection", "catalog fetched", "specialty_choice"),
    edge("specialty_selection", "catalog unavailable or empty", "greeting"),
    edge("specialty_choice", "number in index", "field_capture"),
    edge("specialty_choice", "anything else (refetch)", "specialty_selection"),
    edge("specialty_choice", "idle timeout", "session_closed"),
    edge("field_capture", "reply (name, date)", "field_capture"),
    edge("field_capture", "reply (time)", "extraction"),
    edge("field_capture", "idle timeout", "session_closed"),
    edge("extraction", "fields extracted with a name", "summary"),
    edge("extraction", "inference or parse failure, missing name", "idle"),
    edge("summary", "affirmative", "confirmation"),
    edge("summary", "negative (restart)", "field_capture"),
    edge("summary", "unrecognized reply", "summary"),
    edge("summary", "idle timeout", "session_closed"),
    edge("confirmation", "booking accepted", "session_closed"),
    edge("confirmation", "booking rejected", "session_closed"),
];
