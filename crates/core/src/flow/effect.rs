//! Effects produced by state transitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::appointment::AppointmentData;

/// Presence signal shown to the user while the bot is working
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Composing,
    Paused,
}

/// Work the runtime performs after a transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a text message to the user
    Reply(String),

    /// Update the presence indicator
    SetPresence(Presence),

    /// Fetch the specialty catalog; answers with `CatalogFetched` or
    /// `CatalogUnavailable`
    FetchCatalog,

    /// Ask the language model to extract appointment fields; answers with
    /// `ExtractionCompleted` or `ExtractionFailed`
    RequestExtraction {
        context: AppointmentData,
        utterance: String,
    },

    /// Submit the appointment; answers with `BookingAccepted` or
    /// `BookingRejected`
    SubmitBooking { record: AppointmentData },

    /// Fire `IdleElapsed { ticket }` after `after` unless the session has
    /// moved on
    ArmIdleTimer { ticket: u64, after: Duration },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(text.into())
    }

    /// True for effects that call an external service
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Effect::FetchCatalog | Effect::RequestExtraction { .. } | Effect::SubmitBooking { .. }
        )
    }
}
