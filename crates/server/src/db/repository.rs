use async_trait::async_trait;
use deadpool_postgres::Pool;
use salu_core::Session;
use serde_json::Value as JsonValue;

use super::{ConversationStore, StoreError};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    session JSONB NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
)";

/// Postgres-backed session store, one JSONB row per conversation
#[derive(Clone)]
pub struct PgConversationStore {
    pool: Pool,
}

impl PgConversationStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Create the `conversations` table if it does not exist
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.batch_execute(CREATE_TABLE).await?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn load(&self, conversation_id: &str) -> Result<Option<Session>, StoreError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT session FROM conversations WHERE id = $1",
                &[&conversation_id],
            )
            .await?;

        match row {
            Some(row) => {
                let value: JsonValue = row.get(0);
                Ok(Some(serde_json::from_value(value)?))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, session: &Session) -> Result<(), StoreError> {
        let value = serde_json::to_value(session)?;
        let client = self.pool.get().await?;
        client
            .execute(
                "INSERT INTO conversations (id, session, updated_at) VALUES ($1, $2::jsonb, now())
                 ON CONFLICT (id) DO UPDATE SET session = EXCLUDED.session, updated_at = now()",
                &[&session.conversation_id, &value],
            )
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let client = self.pool.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}
