use chrono::Utc;
use sqlx::SqlitePool;

use crate::dto::console_dto::CreateQuickReplyRequest;
use crate::error::{Error, Result};
use crate::models::quick_reply::QuickReply;

#[derive(Clone)]
pub struct QuickReplyService {
    pool: SqlitePool,
}

impl QuickReplyService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Global templates plus, when given, the ones scoped to that channel.
    pub async fn list(&self, channel_account_id: Option<i64>) -> Result<Vec<QuickReply>> {
        let replies = sqlx::query_as::<_, QuickReply>(
            r#"
            SELECT * FROM quick_replies
            WHERE channel_account_id IS NULL OR channel_account_id = ?
            ORDER BY title ASC, id ASC
            "#,
        )
        .bind(channel_account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(replies)
    }

    pub async fn create(&self, payload: &CreateQuickReplyRequest) -> Result<QuickReply> {
        let reply = sqlx::query_as::<_, QuickReply>(
            r#"
            INSERT INTO quick_replies (title, body, channel_account_id, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(&payload.body)
        .bind(payload.channel_account_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(reply)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM quick_replies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Quick reply {} not found", id)));
        }
        Ok(())
    }
}
