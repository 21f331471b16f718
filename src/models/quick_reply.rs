use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuickReply {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub channel_account_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
