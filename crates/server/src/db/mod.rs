//! Session persistence

mod memory;
mod repository;

pub use memory::MemoryStore;
pub use repository::PgConversationStore;

use async_trait::async_trait;
use deadpool_postgres::{Config, Pool, Runtime};
use salu_core::Session;
use thiserror::Error;
use tokio_postgres::NoTls;

/// Failure reading or writing a session
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Session encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage for one session per conversation
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Load the session for a conversation, if any
    async fn load(&self, conversation_id: &str) -> Result<Option<Session>, StoreError>;

    /// Insert or replace the session
    async fn save(&self, session: &Session) -> Result<(), StoreError>;

    /// Check the backing store is reachable
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Create a connection pool from a database URL
pub async fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}
