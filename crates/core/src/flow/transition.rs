//! Pure state transition function

use thiserror::Error;

use super::{CloseReason, ConvState, Effect, Event, FlowContext, Presence, Session};
use crate::appointment::{AppointmentData, CaptureField};
use crate::copy;
use crate::error::FlowError;
use crate::keywords::{self, Keywords};
use crate::parse;
use crate::specialty::SpecialtyIndex;

/// How a transition changes the stored appointment data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppointmentUpdate {
    Keep,
    /// Field-wise merge; absent fields keep their stored value
    Merge(AppointmentData),
    /// Start from an empty record
    Reset,
}

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub state: ConvState,
    pub update: AppointmentUpdate,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            state,
            update: AppointmentUpdate::Keep,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_update(mut self, update: AppointmentUpdate) -> Self {
        self.update = update;
        self
    }

    fn reply(self, text: impl Into<String>) -> Self {
        self.with_effect(Effect::reply(text))
    }

    /// Arm a fresh idle timer when the new state waits on the user
    fn with_idle_timer(self, session: &Session, ctx: &FlowContext) -> Self {
        match ctx.idle_timeout {
            Some(after) if self.state.awaits_reply() => self.with_effect(Effect::ArmIdleTimer {
                ticket: session.idle_ticket + 1,
                after,
            }),
            _ => self,
        }
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Event {event} is not accepted in state {state}")]
    Unexpected {
        state: &'static str,
        event: &'static str,
    },
}

/// Pure transition function.
///
/// Given the same inputs it always produces the same outputs and performs no
/// I/O. A message that arrives while a step waits on the user is always
/// that step's reply; top-level keywords are only consulted from `Idle`,
/// `SessionClosed` and the menu.
pub fn transition(
    session: &Session,
    ctx: &FlowContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&session.state, event) {
        // ============================================================
        // Idle timeout: preempts any wait on the user
        // ============================================================
        (state, Event::IdleElapsed { ticket }) => {
            let current = ticket == session.idle_ticket;
            if current && state.awaits_reply() && ctx.idle_timeout.is_some() {
                Ok(TransitionResult::new(ConvState::SessionClosed {
                    reason: CloseReason::IdleTimeout,
                })
                .reply(copy::IDLE_CLOSED))
            } else {
                // Stale timer
                Ok(TransitionResult::new(state.clone()))
            }
        }

        // ============================================================
        // Greeting
        // ============================================================
        (ConvState::Idle | ConvState::SessionClosed { .. }, Event::UserMessage { text }) => {
            if ctx.greeting.matches(&text) {
                Ok(greet(session, ctx).with_update(AppointmentUpdate::Reset))
            } else {
                Ok(TransitionResult::new(session.state.clone()))
            }
        }

        (ConvState::Greeting, Event::UserMessage { text }) => {
            if Keywords::insensitive(keywords::BOOK).matches(&text) {
                Ok(TransitionResult::new(ConvState::SpecialtySelection)
                    .reply(copy::SEARCHING)
                    .with_effect(Effect::FetchCatalog))
            } else if Keywords::insensitive(keywords::BROWSE).matches(&text) {
                Ok(TransitionResult::new(ConvState::BrowsingCatalog)
                    .reply(copy::SEARCHING)
                    .with_effect(Effect::FetchCatalog))
            } else if ctx.greeting.matches(&text) {
                Ok(greet(session, ctx))
            } else {
                Ok(TransitionResult::new(ConvState::Greeting)
                    .reply(copy::MENU_HINT)
                    .reply(copy::MENU)
                    .with_idle_timer(session, ctx))
            }
        }

        // ============================================================
        // Catalog listing from the menu
        // ============================================================
        (ConvState::BrowsingCatalog, Event::CatalogFetched { names }) => {
            let index = SpecialtyIndex::from_catalog(names);
            if index.is_empty() {
                return Ok(catalog_unavailable(session, ctx));
            }
            Ok(TransitionResult::new(ConvState::Greeting)
                .reply(copy::catalog_sentence(&index))
                .reply(copy::BOOKING_HINT)
                .with_idle_timer(session, ctx))
        }

        (
            ConvState::BrowsingCatalog | ConvState::SpecialtySelection,
            Event::CatalogUnavailable { .. },
        ) => Ok(catalog_unavailable(session, ctx)),

        // ============================================================
        // Specialty selection
        // ============================================================
        (ConvState::SpecialtySelection, Event::CatalogFetched { names }) => {
            let index = SpecialtyIndex::from_catalog(names);
            if index.is_empty() {
                return Ok(catalog_unavailable(session, ctx));
            }
            let prompt = copy::choose_specialty(&index);
            Ok(TransitionResult::new(ConvState::SpecialtyChoice { index })
                .reply(prompt)
                .with_idle_timer(session, ctx))
        }

        (ConvState::SpecialtyChoice { index }, Event::UserMessage { text }) => {
            match index.resolve(&text) {
                Some(name) => Ok(TransitionResult::new(ConvState::FieldCapture {
                    field: CaptureField::FIRST,
                })
                .with_update(AppointmentUpdate::Merge(AppointmentData::with_specialty(name)))
                .reply(copy::specialty_chosen(name))
                .reply(copy::prompt_for(CaptureField::FIRST))
                .with_idle_timer(session, ctx)),
                // Redirect back to the selection step with a fresh catalog
                None => Ok(TransitionResult::new(ConvState::SpecialtySelection)
                    .reply(FlowError::InvalidSelection(text).apology())
                    .reply(copy::SEARCHING)
                    .with_effect(Effect::FetchCatalog)),
            }
        }

        // ============================================================
        // Field capture
        // ============================================================
        (ConvState::FieldCapture { field }, Event::UserMessage { text }) => {
            Ok(capture(session, ctx, *field, text))
        }

        // ============================================================
        // Extraction
        // ============================================================
        (ConvState::Extraction, Event::ExtractionCompleted { raw }) => {
            Ok(summarize(session, ctx, &raw))
        }

        (ConvState::Extraction, Event::ExtractionFailed { reason }) => {
            Ok(TransitionResult::new(ConvState::Idle)
                .with_effect(Effect::SetPresence(Presence::Paused))
                .reply(FlowError::InferenceUnavailable(reason).apology()))
        }

        // ============================================================
        // Summary: confirm or restart
        // ============================================================
        (ConvState::Summary, Event::UserMessage { text }) => {
            if Keywords::insensitive(keywords::AFFIRMATIVE).leads(&text) {
                Ok(TransitionResult::new(ConvState::Confirmation).with_effect(
                    Effect::SubmitBooking {
                        record: session.appointment_data.clone(),
                    },
                ))
            } else if Keywords::insensitive(keywords::NEGATIVE).leads(&text) {
                // Restart keeps the chosen specialty and asks the fields again
                Ok(TransitionResult::new(ConvState::FieldCapture {
                    field: CaptureField::FIRST,
                })
                .reply(copy::RESTART)
                .reply(copy::prompt_for(CaptureField::FIRST))
                .with_idle_timer(session, ctx))
            } else {
                Ok(TransitionResult::new(ConvState::Summary)
                    .reply(copy::YES_NO_HINT)
                    .with_idle_timer(session, ctx))
            }
        }

        // ============================================================
        // Confirmation
        // ============================================================
        (ConvState::Confirmation, Event::BookingAccepted) => {
            Ok(TransitionResult::new(ConvState::SessionClosed {
                reason: CloseReason::Booked,
            })
            .reply(copy::BOOKED))
        }

        (ConvState::Confirmation, Event::BookingRejected { reason }) => {
            Ok(TransitionResult::new(ConvState::SessionClosed {
                reason: CloseReason::BookingFailed,
            })
            .reply(FlowError::BookingFailed(reason).apology()))
        }

        (state, event) => Err(TransitionError::Unexpected {
            state: state.name(),
            event: event.name(),
        }),
    }
}

fn greet(session: &Session, ctx: &FlowContext) -> TransitionResult {
    TransitionResult::new(ConvState::Greeting)
        .reply(copy::WELCOME)
        .reply(copy::MENU)
        .with_idle_timer(session, ctx)
}

/// Fallback when the catalog cannot be listed: apologize and show the menu
/// again so the user can retry.
fn catalog_unavailable(session: &Session, ctx: &FlowContext) -> TransitionResult {
    TransitionResult::new(ConvState::Greeting)
        .reply(FlowError::CatalogUnavailable(String::new()).apology())
        .reply(copy::MENU)
        .with_idle_timer(session, ctx)
}

fn capture(
    session: &Session,
    ctx: &FlowContext,
    field: CaptureField,
    text: String,
) -> TransitionResult {
    let patch = AppointmentData::captured(field, text);

    match field.next() {
        Some(next) => TransitionResult::new(ConvState::FieldCapture { field: next })
            .with_update(AppointmentUpdate::Merge(patch))
            .reply(copy::prompt_for(next))
            .with_idle_timer(session, ctx),
        None => {
            let context = session.appointment_data.merged(&patch);
            let utterance = copy::extraction_utterance(&context);
            TransitionResult::new(ConvState::Extraction)
                .with_update(AppointmentUpdate::Merge(patch))
                .with_effect(Effect::SetPresence(Presence::Composing))
                .with_effect(Effect::RequestExtraction { context, utterance })
        }
    }
}

fn summarize(session: &Session, ctx: &FlowContext, raw: &str) -> TransitionResult {
    let abandon = |error: FlowError| {
        TransitionResult::new(ConvState::Idle)
            .with_effect(Effect::SetPresence(Presence::Paused))
            .reply(error.apology())
    };

    let patch = match parse::extract_appointment(raw) {
        Ok(patch) if patch.is_empty() => return abandon(FlowError::EmptyExtraction),
        Ok(patch) => patch,
        Err(e) => return abandon(e.into()),
    };

    let merged = session.appointment_data.merged(&patch);
    if !merged.has_name() {
        return abandon(FlowError::IncompleteState("fullName"))
            .with_update(AppointmentUpdate::Merge(patch));
    }

    TransitionResult::new(ConvState::Summary)
        .with_update(AppointmentUpdate::Merge(patch))
        .with_effect(Effect::SetPresence(Presence::Paused))
        .reply(copy::summary(&merged))
        .reply(copy::CONFIRM_QUESTION)
        .with_idle_timer(session, ctx)
}
