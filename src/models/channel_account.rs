use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChannelAccount {
    pub id: i64,
    pub name: String,
    pub channel_id: String,
    #[serde(skip_serializing)]
    pub channel_secret: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}
