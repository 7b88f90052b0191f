//! salu-core: conversation flow engine for the Salu appointment assistant
//!
//! This crate holds everything that does not touch the network: the
//! appointment record and its merge rules, the specialty index, the parser
//! that pulls JSON out of language-model output, and the flow state machine
//! that drives a conversation from greeting to booking.

pub mod appointment;
pub mod copy;
pub mod error;
pub mod flow;
pub mod keywords;
pub mod parse;
pub mod specialty;

pub use appointment::{AppointmentData, CaptureField};
pub use error::FlowError;
pub use flow::{
    AppointmentUpdate, CloseReason, ConvState, Effect, Event, FlowContext, Presence, Session,
    TransitionError, TransitionResult, transition,
};
pub use keywords::Keywords;
pub use parse::{ParseError, extract_appointment, extract_json};
pub use specialty::SpecialtyIndex;
