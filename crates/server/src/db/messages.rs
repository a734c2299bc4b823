//! `PostgreSQL` message repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use portfolio_core::{Message, MessageId, NewMessage};

use super::{MessageCounts, MessageRepository, PgStore, RepositoryError};

const MESSAGE_COLUMNS: &str = "id, name, email, subject, message, read, created_at";

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: MessageId,
    name: String,
    email: String,
    subject: String,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            subject: row.subject,
            message: row.message,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl MessageRepository for PgStore {
    async fn list_messages(&self) -> Result<Vec<Message>, RepositoryError> {
        let rows: Vec<MessageRow> = sqlx::query_as(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn create_message(&self, message: NewMessage) -> Result<Message, RepositoryError> {
        let row: MessageRow = sqlx::query_as(&format!(
            r"
            INSERT INTO messages (id, name, email, subject, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MESSAGE_COLUMNS}
            "
        ))
        .bind(MessageId::generate())
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.subject)
        .bind(&message.message)
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn mark_message_read(&self, id: MessageId) -> Result<Option<Message>, RepositoryError> {
        let row: Option<MessageRow> = sqlx::query_as(&format!(
            "UPDATE messages SET read = TRUE WHERE id = $1 RETURNING {MESSAGE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Message::from))
    }

    async fn delete_message(&self, id: MessageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn message_counts(&self) -> Result<MessageCounts, RepositoryError> {
        let (total, unread): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE NOT read) FROM messages",
        )
        .fetch_one(self.pool())
        .await?;

        Ok(MessageCounts { total, unread })
    }
}
