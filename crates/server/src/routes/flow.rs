//! Flow description endpoint

use axum::Json;
use salu_core::flow::{Edge, TRANSITIONS};
use serde::Serialize;

#[derive(Serialize)]
pub struct FlowDescription {
    initial: &'static str,
    transitions: &'static [Edge],
}

/// GET /flow - Every edge of the conversation state machine
pub async fn get() -> Json<FlowDescription> {
    Json(FlowDescription {
        initial: salu_core::ConvState::default().name(),
        transitions: TRANSITIONS,
    })
}
