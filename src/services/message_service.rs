use sqlx::{SqliteConnection, SqlitePool};

use crate::error::Result;
use crate::models::message::{CreateMessage, Message, MessageBody};

/// Messages visible to one staff member in a customer's conversation: what
/// the customer sent to that staff member (or to nobody in particular) plus
/// everything staff sent to the customer.
const CONVERSATION_FILTER: &str = r#"
    ((sender_id = ?1 AND (recipient_id = ?2 OR recipient_id IS NULL)) OR recipient_id = ?1)
"#;

/// Unread bookkeeping only covers rows addressed to a staff member. Rows
/// with no recipient exist only until the first staff account adopts them.
const UNREAD_FILTER: &str = r#"
    sender_id = ?1 AND recipient_id = ?2 AND is_read = 0
"#;

#[derive(Clone)]
pub struct MessageService {
    pool: SqlitePool,
}

impl MessageService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, msg: &CreateMessage) -> Result<Message> {
        let mut conn = self.pool.acquire().await?;
        insert_message(&mut conn, msg).await
    }

    /// Conversation history in display order: timestamp, then id.
    pub async fn conversation(&self, customer_id: i64, staff_id: i64) -> Result<Vec<Message>> {
        let query = format!(
            "SELECT * FROM messages WHERE {} ORDER BY created_at ASC, id ASC",
            CONVERSATION_FILTER
        );
        let messages = sqlx::query_as::<_, Message>(&query)
            .bind(customer_id)
            .bind(staff_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    pub async fn last_message(&self, customer_id: i64, staff_id: i64) -> Result<Option<Message>> {
        let query = format!(
            "SELECT * FROM messages WHERE {} ORDER BY created_at DESC, id DESC LIMIT 1",
            CONVERSATION_FILTER
        );
        let message = sqlx::query_as::<_, Message>(&query)
            .bind(customer_id)
            .bind(staff_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(message)
    }

    pub async fn unread_count(&self, customer_id: i64, staff_id: i64) -> Result<i64> {
        let query = format!("SELECT COUNT(*) FROM messages WHERE {}", UNREAD_FILTER);
        let count: (i64,) = sqlx::query_as(&query)
            .bind(customer_id)
            .bind(staff_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Flags the customer's messages to this staff member as read, up to and
    /// including `through_id`. Rows that arrive after the caller fetched its
    /// history keep their unread flag. Only ever moves `is_read` from false
    /// to true.
    pub async fn mark_as_read(&self, customer_id: i64, staff_id: i64, through_id: i64) -> Result<u64> {
        let query = format!(
            "UPDATE messages SET is_read = 1 WHERE {} AND id <= ?3",
            UNREAD_FILTER
        );
        let result = sqlx::query(&query)
            .bind(customer_id)
            .bind(staff_id)
            .bind(through_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Channel account of the customer's most recent inbound message.
    pub async fn latest_inbound_channel(&self, customer_id: i64) -> Result<Option<i64>> {
        let row: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT channel_account_id FROM messages
            WHERE sender_id = ? AND channel_account_id IS NOT NULL
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.0))
    }
}

pub async fn insert_message(conn: &mut SqliteConnection, msg: &CreateMessage) -> Result<Message> {
    let (text, media_url, package_id, sticker_id) = match &msg.body {
        MessageBody::Text { text } | MessageBody::System { text } => {
            (Some(text.as_str()), None, None, None)
        }
        MessageBody::Image { url } => (None, Some(url.as_str()), None, None),
        MessageBody::Sticker {
            package_id,
            sticker_id,
        } => (None, None, Some(package_id.as_str()), Some(sticker_id.as_str())),
    };

    let message = sqlx::query_as::<_, Message>(
        r#"
        INSERT INTO messages (
            text, kind, media_url, sticker_id, package_id, created_at,
            is_read, sender_id, recipient_id, channel_account_id
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(text)
    .bind(msg.body.kind().as_str())
    .bind(media_url)
    .bind(sticker_id)
    .bind(package_id)
    .bind(msg.created_at)
    .bind(msg.is_read)
    .bind(msg.sender_id)
    .bind(msg.recipient_id)
    .bind(msg.channel_account_id)
    .fetch_one(conn)
    .await?;

    Ok(message)
}
