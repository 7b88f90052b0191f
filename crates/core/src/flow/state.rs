//! Conversation state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::appointment::{AppointmentData, CaptureField};
use crate::keywords::Keywords;
use crate::specialty::SpecialtyIndex;

/// Where a conversation currently stands
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ConvState {
    /// No active step; only a greeting starts a flow
    #[default]
    Idle,

    /// Menu shown, waiting for the user's choice
    Greeting,

    /// Catalog fetch in flight for the informational listing
    BrowsingCatalog,

    /// Catalog fetch in flight for a booking
    SpecialtySelection,

    /// Numbered list shown, waiting for a number from `index`
    SpecialtyChoice { index: SpecialtyIndex },

    /// Waiting for the raw reply to `field`
    FieldCapture { field: CaptureField },

    /// Inference request in flight
    Extraction,

    /// Recap shown, waiting for yes/no
    Summary,

    /// Booking request in flight
    Confirmation,

    /// Terminal for this attempt; a greeting starts over
    SessionClosed { reason: CloseReason },
}

/// Why a session was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    IdleTimeout,
    Booked,
    BookingFailed,
}

impl ConvState {
    /// Stable snake_case name, used in logs, metrics and the transition table
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::Idle => "idle",
            ConvState::Greeting => "greeting",
            ConvState::BrowsingCatalog => "browsing_catalog",
            ConvState::SpecialtySelection => "specialty_selection",
            ConvState::SpecialtyChoice { .. } => "specialty_choice",
            ConvState::FieldCapture { .. } => "field_capture",
            ConvState::Extraction => "extraction",
            ConvState::Summary => "summary",
            ConvState::Confirmation => "confirmation",
            ConvState::SessionClosed { .. } => "session_closed",
        }
    }

    /// States suspended on the next inbound message
    pub fn awaits_reply(&self) -> bool {
        matches!(
            self,
            ConvState::Greeting
                | ConvState::SpecialtyChoice { .. }
                | ConvState::FieldCapture { .. }
                | ConvState::Summary
        )
    }

    /// States waiting on an external call rather than on the user
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            ConvState::BrowsingCatalog
                | ConvState::SpecialtySelection
                | ConvState::Extraction
                | ConvState::Confirmation
        )
    }
}

/// Everything persisted for one Conversation Identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub conversation_id: String,
    pub state: ConvState,
    pub appointment_data: AppointmentData,
    /// Ticket of the most recently armed idle timer
    pub idle_ticket: u64,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            state: ConvState::Idle,
            appointment_data: AppointmentData::default(),
            idle_ticket: 0,
            updated_at: Utc::now(),
        }
    }

    /// True when the session has been waiting on the user for longer than
    /// `idle` as of `now`
    pub fn idle_expired(&self, idle: Duration, now: DateTime<Utc>) -> bool {
        if !self.state.awaits_reply() {
            return false;
        }
        match (now - self.updated_at).to_std() {
            Ok(waited) => waited >= idle,
            Err(_) => false,
        }
    }
}

/// Configuration the transition function reads
#[derive(Debug, Clone)]
pub struct FlowContext {
    /// Keywords that open the menu
    pub greeting: Keywords,
    /// Bound on every wait for a user reply; `None` disables it
    pub idle_timeout: Option<Duration>,
}

impl Default for FlowContext {
    fn default() -> Self {
        Self {
            greeting: Keywords::new(["Hola"], true),
            idle_timeout: Some(Duration::from_secs(300)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn state_serializes_with_step_tag() {
        let state = ConvState::FieldCapture {
            field: CaptureField::Date,
        };
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({"step": "field_capture", "field": "date"})
        );

        let closed: ConvState =
            serde_json::from_value(json!({"step": "session_closed", "reason": "booked"})).unwrap();
        assert_eq!(
            closed,
            ConvState::SessionClosed {
                reason: CloseReason::Booked
            }
        );
    }

    #[test]
    fn session_round_trips_through_json() {
        let mut session = Session::new("5215512345678");
        session.state = ConvState::SpecialtyChoice {
            index: SpecialtyIndex::from_catalog(["Cardiología"]),
        };
        session.appointment_data = AppointmentData::with_specialty("Cardiología");
        session.idle_ticket = 3;

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["appointmentData"]["specialty"], "Cardiología");
        let back: Session = serde_json::from_value(value).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn session_keeps_raw_captures_through_json() {
        let mut session = Session::new("c1");
        session.state = ConvState::FieldCapture {
            field: CaptureField::Time,
        };
        session.appointment_data = AppointmentData::captured(CaptureField::FullName, "null");
        session
            .appointment_data
            .merge(AppointmentData::captured(CaptureField::Date, "  mañana  "));

        let back: Session = serde_json::from_str(&serde_json::to_string(&session).unwrap()).unwrap();
        assert_eq!(back.appointment_data.full_name.as_deref(), Some("null"));
        assert_eq!(back.appointment_data.date.as_deref(), Some("  mañana  "));
        assert_eq!(back, session);
    }

    #[test]
    fn idle_expiry_only_applies_while_waiting() {
        let idle = Duration::from_secs(60);
        let mut session = Session::new("c1");
        let later = session.updated_at + chrono::Duration::seconds(61);

        assert!(!session.idle_expired(idle, later));
        session.state = ConvState::Greeting;
        assert!(session.idle_expired(idle, later));
        assert!(!session.idle_expired(idle, session.updated_at));
    }
}
