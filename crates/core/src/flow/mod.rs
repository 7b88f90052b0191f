//! Conversation flow state machine
//!
//! `transition` is pure: it maps the current session and an incoming event
//! to the next state, an appointment update and a list of effects. The
//! server runtime executes the effects and feeds their outcomes back in as
//! new events.

mod effect;
mod event;
mod state;
mod table;
mod transition;

pub use effect::{Effect, Presence};
pub use event::Event;
pub use state::{CloseReason, ConvState, FlowContext, Session};
pub use table::{Edge, TRANSITIONS};
pub use transition::{AppointmentUpdate, TransitionError, TransitionResult, transition};
