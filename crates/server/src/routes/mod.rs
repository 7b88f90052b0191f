pub mod conversation;
pub mod flow;
pub mod health;
pub mod metrics;

use axum::{Router, routing::{get, post}};

use crate::AppState;

/// Build conversation routes
pub fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route("/conversations/{id}", get(conversation::get_conversation))
        .route("/conversations/{id}/messages", post(conversation::post_message))
}
