//! Mock collaborators for executor tests

use super::traits::*;
use crate::db::{ConversationStore, MemoryStore, StoreError};
use crate::upstream::ClientError;
use async_trait::async_trait;
use salu_core::{AppointmentData, Session};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Upstream failure used by the mocks
pub fn unavailable(service: &'static str) -> ClientError {
    ClientError::Status {
        service,
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "mock outage".to_string(),
    }
}

// ============================================================================
// Mock catalog
// ============================================================================

/// Catalog that answers with queued results
#[derive(Default)]
pub struct MockCatalog {
    responses: Mutex<VecDeque<Result<Vec<String>, ClientError>>>,
    pub calls: Mutex<usize>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_names(&self, names: &[&str]) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(names.iter().map(|n| n.to_string()).collect()));
    }

    pub fn queue_error(&self) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(unavailable("mock catalog")));
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SpecialtySource for MockCatalog {
    async fn fetch_specialties(&self) -> Result<Vec<String>, ClientError> {
        *self.calls.lock().unwrap() += 1;
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable("mock catalog")))
    }
}

// ============================================================================
// Mock extractor
// ============================================================================

/// Extractor that answers with queued raw text and records its inputs
#[derive(Default)]
pub struct MockExtractor {
    responses: Mutex<VecDeque<Result<String, ClientError>>>,
    pub requests: Mutex<Vec<(AppointmentData, String)>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue_raw(&self, raw: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(raw.to_string()));
    }

    pub fn queue_error(&self) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(unavailable("mock extractor")));
    }

    pub fn recorded_requests(&self) -> Vec<(AppointmentData, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(
        &self,
        _instructions: &str,
        context: &AppointmentData,
        utterance: &str,
    ) -> Result<String, ClientError> {
        self.requests
            .lock()
            .unwrap()
            .push((context.clone(), utterance.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(unavailable("mock extractor")))
    }
}

// ============================================================================
// Mock booking
// ============================================================================

/// Booking endpoint that accepts by default and records submissions
#[derive(Default)]
pub struct MockBooking {
    failures: Mutex<VecDeque<ClientError>>,
    pub submitted: Mutex<Vec<AppointmentData>>,
}

impl MockBooking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next submission fail
    pub fn queue_error(&self) {
        self.failures
            .lock()
            .unwrap()
            .push_back(unavailable("mock booking"));
    }

    pub fn recorded_submissions(&self) -> Vec<AppointmentData> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingApi for MockBooking {
    async fn submit(&self, record: &AppointmentData) -> Result<(), ClientError> {
        self.submitted.lock().unwrap().push(record.clone());
        match self.failures.lock().unwrap().pop_front() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Flaky store
// ============================================================================

/// In-memory store whose saves start failing after a set number of
/// successes
pub struct FlakyStore {
    inner: MemoryStore,
    saves_left: Mutex<Option<usize>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            saves_left: Mutex::new(None),
        }
    }

    /// Allow `n` more saves, then fail every save
    pub fn fail_saves_after(&self, n: usize) {
        *self.saves_left.lock().unwrap() = Some(n);
    }

    pub fn recover(&self) {
        *self.saves_left.lock().unwrap() = None;
    }
}

#[async_trait]
impl ConversationStore for FlakyStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<Session>, StoreError> {
        self.inner.load(conversation_id).await
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let allowed = match self.saves_left.lock().unwrap().as_mut() {
            None => true,
            Some(0) => false,
            Some(n) => {
                *n -= 1;
                true
            }
        };
        if !allowed {
            let io = std::io::Error::other("store offline");
            return Err(StoreError::Serialization(serde_json::Error::io(io)));
        }
        self.inner.save(session).await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.inner.ping().await
    }
}
