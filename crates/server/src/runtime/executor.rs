//! Effect executor
//!
//! Loads a session, feeds events through the pure `transition` function and
//! performs the resulting effects. Effects that call an upstream produce a
//! follow-up event, which is queued and transitioned in turn until the flow
//! settles on a state that waits for the user.

use chrono::Utc;
use salu_core::{
    AppointmentData, AppointmentUpdate, ConvState, Effect, Event, FlowContext, Session,
    transition,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

use super::traits::{BookingApi, Channel, Extractor, SpecialtySource};
use crate::db::{ConversationStore, StoreError};
use crate::upstream::ClientError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// External services the runtime talks to
pub struct Collaborators {
    pub store: Arc<dyn ConversationStore>,
    pub catalog: Arc<dyn SpecialtySource>,
    pub extractor: Arc<dyn Extractor>,
    pub booking: Arc<dyn BookingApi>,
    /// Channel for messages produced outside a request, i.e. idle timeouts
    pub outbound: Arc<dyn Channel>,
}

/// Drives every conversation. Events for one conversation are serialized
/// by a per-conversation lock; different conversations run concurrently.
pub struct FlowRuntime {
    ctx: FlowContext,
    instructions: String,
    store: Arc<dyn ConversationStore>,
    catalog: Arc<dyn SpecialtySource>,
    extractor: Arc<dyn Extractor>,
    booking: Arc<dyn BookingApi>,
    outbound: Arc<dyn Channel>,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FlowRuntime {
    pub fn new(ctx: FlowContext, instructions: impl Into<String>, parts: Collaborators) -> Self {
        Self {
            ctx,
            instructions: instructions.into(),
            store: parts.store,
            catalog: parts.catalog,
            extractor: parts.extractor,
            booking: parts.booking,
            outbound: parts.outbound,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn context(&self) -> &FlowContext {
        &self.ctx
    }

    /// Current session for a conversation, without side effects
    pub async fn snapshot(&self, conversation_id: &str) -> Result<Option<Session>, RuntimeError> {
        Ok(self.store.load(conversation_id).await?)
    }

    /// Process one inbound message. Replies go to `channel`.
    ///
    /// Replies already sent are never withdrawn: when the session cannot be
    /// saved at the end of the turn the failure is logged and the session is
    /// still returned.
    pub async fn handle_message(
        self: &Arc<Self>,
        conversation_id: &str,
        text: &str,
        channel: &dyn Channel,
    ) -> Result<Session, RuntimeError> {
        let lock = self.lock_for(conversation_id);
        let result = {
            let _guard = lock.lock().await;
            self.message_turn(conversation_id, text, channel).await
        };
        self.release_lock(conversation_id, lock);
        result
    }

    async fn message_turn(
        self: &Arc<Self>,
        conversation_id: &str,
        text: &str,
        channel: &dyn Channel,
    ) -> Result<Session, RuntimeError> {
        let mut session = self
            .store
            .load(conversation_id)
            .await?
            .unwrap_or_else(|| Session::new(conversation_id));

        let before = session.clone();

        // Only a turn whose final save failed leaves an in-flight state behind
        if session.state.is_in_flight() {
            tracing::warn!(
                conversation_id,
                state = session.state.name(),
                "Abandoning interrupted turn"
            );
            session.state = ConvState::Idle;
        }

        // A timer lost to a restart still closes the wait
        if let Some(idle) = self.ctx.idle_timeout {
            if session.idle_expired(idle, Utc::now()) {
                tracing::info!(
                    conversation_id,
                    state = session.state.name(),
                    "Session idled out before this message"
                );
                let ticket = session.idle_ticket;
                self.dispatch(&mut session, Event::IdleElapsed { ticket }, channel)
                    .await;
            }
        }

        self.dispatch(&mut session, Event::user(text), channel).await;

        // Ignored messages outside a flow leave nothing to store
        let unchanged = session.state == before.state
            && session.appointment_data == before.appointment_data
            && session.idle_ticket == before.idle_ticket;
        if unchanged && !session.state.awaits_reply() {
            return Ok(session);
        }

        session.updated_at = Utc::now();
        self.persist(&session).await;
        Ok(session)
    }

    /// Deliver an idle timer. Stale tickets are dropped.
    pub async fn handle_idle(
        self: &Arc<Self>,
        conversation_id: &str,
        ticket: u64,
    ) -> Result<(), RuntimeError> {
        let lock = self.lock_for(conversation_id);
        let result = {
            let _guard = lock.lock().await;
            self.idle_turn(conversation_id, ticket).await
        };
        self.release_lock(conversation_id, lock);
        result
    }

    async fn idle_turn(self: &Arc<Self>, conversation_id: &str, ticket: u64) -> Result<(), RuntimeError> {
        let Some(mut session) = self.store.load(conversation_id).await? else {
            return Ok(());
        };
        if session.idle_ticket != ticket {
            tracing::debug!(conversation_id, ticket, "Stale idle timer");
            return Ok(());
        }

        let outbound = Arc::clone(&self.outbound);
        self.dispatch(&mut session, Event::IdleElapsed { ticket }, outbound.as_ref())
            .await;

        session.updated_at = Utc::now();
        self.persist(&session).await;
        Ok(())
    }

    /// Save at the end of a turn; effects have already happened, so a
    /// failure is logged rather than returned
    async fn persist(&self, session: &Session) {
        if let Err(e) = self.store.save(session).await {
            metrics::counter!("flow_store_failures_total").increment(1);
            tracing::error!(
                conversation_id = %session.conversation_id,
                state = session.state.name(),
                error = %e,
                "Failed to save session after turn"
            );
        }
    }

    fn lock_for(&self, conversation_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(locks.entry(conversation_id.to_string()).or_default())
    }

    /// Drop the map entry once no other turn holds or waits on it
    fn release_lock(&self, conversation_id: &str, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one here
        if Arc::strong_count(&lock) == 2 {
            locks.remove(conversation_id);
        }
    }

    async fn dispatch(self: &Arc<Self>, session: &mut Session, event: Event, channel: &dyn Channel) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let event_name = event.name();
            let result = match transition(session, &self.ctx, event) {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(
                        conversation_id = %session.conversation_id,
                        error = %e,
                        "Event dropped"
                    );
                    continue;
                }
            };

            let from = session.state.name();
            let to = result.state.name();
            tracing::info!(
                conversation_id = %session.conversation_id,
                from,
                to,
                event = event_name,
                effects = result.effects.len(),
                "Flow transition"
            );
            metrics::counter!("flow_transitions_total", "from" => from, "to" => to).increment(1);

            match result.update {
                AppointmentUpdate::Keep => {}
                AppointmentUpdate::Merge(patch) => session.appointment_data.merge(patch),
                AppointmentUpdate::Reset => session.appointment_data = AppointmentData::default(),
            }
            session.state = result.state;

            for effect in result.effects {
                if let Some(next) = self.execute(session, effect, channel).await {
                    queue.push_back(next);
                }
            }
        }
    }

    async fn execute(
        self: &Arc<Self>,
        session: &mut Session,
        effect: Effect,
        channel: &dyn Channel,
    ) -> Option<Event> {
        let conversation_id = session.conversation_id.as_str();

        match effect {
            Effect::Reply(text) => {
                channel.send_text(conversation_id, &text).await;
                None
            }
            Effect::SetPresence(presence) => {
                channel.set_presence(conversation_id, presence).await;
                None
            }
            Effect::FetchCatalog => Some(match self.catalog.fetch_specialties().await {
                Ok(names) => Event::CatalogFetched { names },
                Err(e) => Event::CatalogUnavailable {
                    reason: upstream_failure("catalog", conversation_id, e),
                },
            }),
            Effect::RequestExtraction { context, utterance } => Some(
                match self
                    .extractor
                    .extract(&self.instructions, &context, &utterance)
                    .await
                {
                    Ok(raw) => Event::ExtractionCompleted { raw },
                    Err(e) => Event::ExtractionFailed {
                        reason: upstream_failure("extraction", conversation_id, e),
                    },
                },
            ),
            Effect::SubmitBooking { record } => {
                // Record the in-flight state first so a lost final save
                // cannot lead to a second submission
                if let Err(e) = self.store.save(session).await {
                    metrics::counter!("flow_store_failures_total").increment(1);
                    tracing::error!(conversation_id, error = %e, "Booking not sent, session not saved");
                    return Some(Event::BookingRejected {
                        reason: e.to_string(),
                    });
                }
                Some(match self.booking.submit(&record).await {
                    Ok(()) => Event::BookingAccepted,
                    Err(e) => Event::BookingRejected {
                        reason: upstream_failure("booking", conversation_id, e),
                    },
                })
            }
            Effect::ArmIdleTimer { ticket, after } => {
                session.idle_ticket = ticket;
                self.arm_idle_timer(session.conversation_id.clone(), ticket, after);
                None
            }
        }
    }

    fn arm_idle_timer(self: &Arc<Self>, conversation_id: String, ticket: u64, after: Duration) {
        let runtime = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Err(e) = runtime.handle_idle(&conversation_id, ticket).await {
                tracing::error!(conversation_id, error = %e, "Idle timeout handling failed");
            }
        });
    }
}

fn upstream_failure(call: &'static str, conversation_id: &str, error: ClientError) -> String {
    metrics::counter!("flow_upstream_failures_total", "call" => call).increment(1);
    tracing::warn!(conversation_id, call, error = %error, "Upstream call failed");
    error.to_string()
}
