//! Events that drive the flow

/// Inputs to [`transition`](super::transition)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Inbound message from the user
    UserMessage { text: String },

    /// Catalog fetch succeeded with these raw names
    CatalogFetched { names: Vec<String> },

    /// Catalog fetch failed
    CatalogUnavailable { reason: String },

    /// Inference call returned this raw text
    ExtractionCompleted { raw: String },

    /// Inference call failed
    ExtractionFailed { reason: String },

    /// Booking endpoint accepted the appointment
    BookingAccepted,

    /// Booking endpoint rejected the appointment or was unreachable
    BookingRejected { reason: String },

    /// The idle timer armed with `ticket` fired
    IdleElapsed { ticket: u64 },
}

impl Event {
    pub fn user(text: impl Into<String>) -> Self {
        Event::UserMessage { text: text.into() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::UserMessage { .. } => "user_message",
            Event::CatalogFetched { .. } => "catalog_fetched",
            Event::CatalogUnavailable { .. } => "catalog_unavailable",
            Event::ExtractionCompleted { .. } => "extraction_completed",
            Event::ExtractionFailed { .. } => "extraction_failed",
            Event::BookingAccepted => "booking_accepted",
            Event::BookingRejected { .. } => "booking_rejected",
            Event::IdleElapsed { .. } => "idle_elapsed",
        }
    }
}
