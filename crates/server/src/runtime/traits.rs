//! Trait abstractions for runtime I/O
//!
//! The executor only sees these seams, so tests can swap in mocks.

use async_trait::async_trait;
use salu_core::{AppointmentData, Presence};

use crate::upstream::ClientError;

/// Source of specialty names, in catalog order
#[async_trait]
pub trait SpecialtySource: Send + Sync {
    async fn fetch_specialties(&self) -> Result<Vec<String>, ClientError>;
}

/// Language model that turns an utterance into raw extraction text
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(
        &self,
        instructions: &str,
        context: &AppointmentData,
        utterance: &str,
    ) -> Result<String, ClientError>;
}

/// Endpoint that records a confirmed appointment
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn submit(&self, record: &AppointmentData) -> Result<(), ClientError>;
}

/// Delivery of messages to the user.
///
/// Delivery is best effort: implementations log failures instead of
/// returning them.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send_text(&self, conversation_id: &str, text: &str);

    async fn set_presence(&self, conversation_id: &str, presence: Presence);
}
