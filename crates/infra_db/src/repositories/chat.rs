//! WhatsApp chat inbox repository
//!
//! The store's chat inbox keeps one row per phone number holding the latest
//! message. Outbound credit notices are written here so they show up in the
//! conversation as answered.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or refreshes the chat for a phone number with an outbound message
    ///
    /// The chat is marked `responded` and its unread counter reset.
    pub async fn upsert_outbound(&self, message: &OutboundChatMessage) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO whatsapp_chats (
                id, customer_phone, customer_name, customer_id,
                last_message, message_time, status, unread_count, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, 'responded', 0, $6, $6)
            ON CONFLICT (customer_phone) DO UPDATE SET
                customer_name = EXCLUDED.customer_name,
                customer_id = EXCLUDED.customer_id,
                last_message = EXCLUDED.last_message,
                message_time = EXCLUDED.message_time,
                status = 'responded',
                unread_count = 0,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&message.customer_phone)
        .bind(&message.customer_name)
        .bind(message.customer_id)
        .bind(&message.text)
        .bind(message.sent_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Retrieves the chat for a phone number
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<ChatRow>, DatabaseError> {
        let row = sqlx::query_as::<_, ChatRow>(
            r#"
            SELECT id, customer_phone, customer_name, customer_id,
                   last_message, message_time, status, unread_count
            FROM whatsapp_chats
            WHERE customer_phone = $1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}

/// Database row for a chat
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChatRow {
    pub id: Uuid,
    pub customer_phone: String,
    pub customer_name: String,
    pub customer_id: Option<Uuid>,
    pub last_message: String,
    pub message_time: DateTime<Utc>,
    pub status: String,
    pub unread_count: i32,
}

/// Data for an outbound chat message
#[derive(Debug, Clone)]
pub struct OutboundChatMessage {
    pub customer_phone: String,
    pub customer_name: String,
    pub customer_id: Option<Uuid>,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}
