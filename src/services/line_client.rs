use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::user::ProviderProfile;

/// Message objects accepted by the LINE push endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        #[serde(rename = "previewImageUrl")]
        preview_image_url: String,
    },
    Sticker {
        #[serde(rename = "packageId")]
        package_id: String,
        #[serde(rename = "stickerId")]
        sticker_id: String,
    },
}

/// Operations the console needs from the messaging provider. Every call is
/// made with the access token of one channel account.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LineApi: Send + Sync {
    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<ProviderProfile>;

    async fn push_message(
        &self,
        access_token: &str,
        to: &str,
        messages: &[OutboundMessage],
    ) -> Result<()>;

    async fn get_message_content(&self, access_token: &str, message_id: &str) -> Result<Bytes>;
}

#[derive(Clone)]
pub struct HttpLineClient {
    client: Client,
    api_base: String,
    data_api_base: String,
}

impl HttpLineClient {
    pub fn new(client: Client, api_base: String, data_api_base: String) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            data_api_base: data_api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(Error::Provider(format!("{} {}", status.as_u16(), body)))
    }
}

#[async_trait]
impl LineApi for HttpLineClient {
    async fn get_profile(&self, access_token: &str, user_id: &str) -> Result<ProviderProfile> {
        let url = format!("{}/v2/bot/profile/{}", self.api_base, user_id);
        let resp = self.client.get(&url).bearer_auth(access_token).send().await?;
        let profile = Self::check(resp).await?.json::<ProviderProfile>().await?;
        Ok(profile)
    }

    async fn push_message(
        &self,
        access_token: &str,
        to: &str,
        messages: &[OutboundMessage],
    ) -> Result<()> {
        let url = format!("{}/v2/bot/message/push", self.api_base);
        let body = serde_json::json!({ "to": to, "messages": messages });
        let resp = self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn get_message_content(&self, access_token: &str, message_id: &str) -> Result<Bytes> {
        let url = format!(
            "{}/v2/bot/message/{}/content",
            self.data_api_base, message_id
        );
        let resp = self.client.get(&url).bearer_auth(access_token).send().await?;
        let bytes = Self::check(resp).await?.bytes().await?;
        Ok(bytes)
    }
}

/// Bounds a provider call; an elapsed deadline becomes `Error::Timeout`.
pub async fn with_timeout<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| Error::Timeout(operation))?
}
