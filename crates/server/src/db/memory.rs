use async_trait::async_trait;
use salu_core::Session;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{ConversationStore, StoreError};

/// In-process session store, used when no database is configured
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<Session>, StoreError> {
        Ok(self.sessions.read().await.get(conversation_id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.sessions
            .write()
            .await
            .insert(session.conversation_id.clone(), session.clone());
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
