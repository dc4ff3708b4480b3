//! The room's append-only message log.

use super::{from_millis, to_millis, Store};
use chrono::Utc;
use uuid::Uuid;
use wheredunno_core::{
    error::WhereError,
    message::{ChatMessage, NewMessage},
};

type MessageRow = (String, String, String, String, i64);

fn row_to_message(
    (id, text, user_id, user_name, created_at_ms): MessageRow,
) -> Result<ChatMessage, WhereError> {
    Ok(ChatMessage {
        id,
        text,
        user_id,
        user_name,
        created_at: from_millis(created_at_ms)?,
    })
}

impl Store {
    /// Append a message, assigning its id and creation time.
    pub async fn insert_message(&self, message: &NewMessage) -> Result<ChatMessage, WhereError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        sqlx::query(
            "INSERT INTO messages (id, text, user_id, user_name, created_at_ms) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&message.text)
        .bind(&message.user_id)
        .bind(&message.user_name)
        .bind(to_millis(created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| WhereError::Memory(format!("insert message failed: {e}")))?;

        Ok(ChatMessage {
            id,
            text: message.text.clone(),
            user_id: message.user_id.clone(),
            user_name: message.user_name.clone(),
            // Round-trip through millis so the returned copy equals what a later read yields.
            created_at: from_millis(to_millis(created_at))?,
        })
    }

    /// Every message, oldest first.
    pub async fn list_messages(&self) -> Result<Vec<ChatMessage>, WhereError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, text, user_id, user_name, created_at_ms FROM messages \
             ORDER BY created_at_ms ASC, seq ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WhereError::Memory(format!("list messages failed: {e}")))?;

        rows.into_iter().map(row_to_message).collect()
    }

    /// The newest `limit` messages, oldest first.
    pub async fn recent_messages(&self, limit: i64) -> Result<Vec<ChatMessage>, WhereError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, text, user_id, user_name, created_at_ms FROM ( \
                 SELECT seq, id, text, user_id, user_name, created_at_ms FROM messages \
                 ORDER BY created_at_ms DESC, seq DESC LIMIT ? \
             ) ORDER BY created_at_ms ASC, seq ASC",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WhereError::Memory(format!("recent messages failed: {e}")))?;

        rows.into_iter().map(row_to_message).collect()
    }

    /// Total number of stored messages.
    pub async fn message_count(&self) -> Result<i64, WhereError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| WhereError::Memory(format!("count messages failed: {e}")))?;
        Ok(count)
    }
}
