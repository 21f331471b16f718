use chrono::Utc;
use sqlx::SqlitePool;

use crate::dto::console_dto::CreateChannelRequest;
use crate::error::{Error, Result};
use crate::models::channel_account::ChannelAccount;

/// Registry of LINE channel accounts, keyed by the provider channel id that
/// arrives as the webhook `destination`.
#[derive(Clone)]
pub struct ChannelService {
    pool: SqlitePool,
}

impl ChannelService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_destination(&self, destination: &str) -> Result<Option<ChannelAccount>> {
        let account = sqlx::query_as::<_, ChannelAccount>(
            "SELECT * FROM channel_accounts WHERE channel_id = ?",
        )
        .bind(destination)
        .fetch_optional(&self.pool)
        .await?;
        Ok(account)
    }

    pub async fn get(&self, id: i64) -> Result<Option<ChannelAccount>> {
        let account =
            sqlx::query_as::<_, ChannelAccount>("SELECT * FROM channel_accounts WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(account)
    }

    pub async fn list(&self) -> Result<Vec<ChannelAccount>> {
        let accounts =
            sqlx::query_as::<_, ChannelAccount>("SELECT * FROM channel_accounts ORDER BY name ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(accounts)
    }

    pub async fn create(&self, payload: &CreateChannelRequest) -> Result<ChannelAccount> {
        let channel_id = payload.channel_id.trim();
        if self.find_by_destination(channel_id).await?.is_some() {
            return Err(Error::BadRequest(format!(
                "Channel {} is already registered",
                channel_id
            )));
        }

        let account = sqlx::query_as::<_, ChannelAccount>(
            r#"
            INSERT INTO channel_accounts (name, channel_id, channel_secret, access_token, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(payload.name.trim())
        .bind(channel_id)
        .bind(&payload.channel_secret)
        .bind(&payload.access_token)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(channel_account_id = account.id, channel_id = %account.channel_id, "channel account registered");
        Ok(account)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM channel_accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Channel account {} not found", id)));
        }
        Ok(())
    }
}
