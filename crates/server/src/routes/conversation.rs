//! Conversation HTTP handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use salu_core::Session;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::channel::{Outbound, RecordingChannel};
use crate::error::AppError;
use crate::middleware::RequestId;

/// Body of an inbound message
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    pub text: String,
}

/// Everything the bot sent in answer to one message
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    conversation_id: String,
    step: &'static str,
    outbound: Vec<Outbound>,
}

/// POST /conversations/{id}/messages - Deliver one user message
pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(request_id): Extension<RequestId>,
    Json(body): Json<InboundMessage>,
) -> Result<Json<TurnResponse>, AppError> {
    if id.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Conversation id must not be empty".to_string(),
        ));
    }

    tracing::debug!(
        request_id = %request_id.0,
        conversation_id = %id,
        "Inbound message"
    );

    let channel = RecordingChannel::new();
    let session = state
        .runtime
        .handle_message(&id, &body.text, &channel)
        .await?;

    Ok(Json(TurnResponse {
        conversation_id: session.conversation_id,
        step: session.state.name(),
        outbound: channel.into_outbound(),
    }))
}

/// GET /conversations/{id} - Current session
pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, AppError> {
    match state.runtime.snapshot(&id).await? {
        Some(session) => Ok(Json(session)),
        None => Err(AppError::NotFound(format!("Conversation {} not found", id))),
    }
}
