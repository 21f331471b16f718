use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::dto::webhook_dto::{InboundContent, InboundEvent, WebhookEnvelope};
use crate::error::{Error, Result};
use crate::models::channel_account::ChannelAccount;
use crate::models::message::{CreateMessage, Message, MessageBody};
use crate::models::user::{ProviderProfile, User};
use crate::services::broadcast_service::BroadcastService;
use crate::services::channel_service::ChannelService;
use crate::services::identity_service::{list_staff, resolve_customer};
use crate::services::line_client::{with_timeout, LineApi};
use crate::services::media_service::{sniff_image_extension, MediaService};
use crate::services::message_service::insert_message;
use crate::utils::line_signature::verify_signature;

pub const FOLLOW_TEXT: &str = "Added the account as a friend";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// No channel account matches the destination; acknowledged and ignored.
    UnknownDestination,
    Processed(IngestReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub stored: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Result of one committed inbound event.
#[derive(Debug, Clone)]
pub struct StoredInbound {
    pub customer: User,
    pub messages: Vec<Message>,
}

#[derive(Clone)]
pub struct IngestService {
    pool: SqlitePool,
    channels: ChannelService,
    media: MediaService,
    broadcaster: BroadcastService,
    line: Arc<dyn LineApi>,
    provider_timeout: Duration,
}

impl IngestService {
    pub fn new(
        pool: SqlitePool,
        channels: ChannelService,
        media: MediaService,
        broadcaster: BroadcastService,
        line: Arc<dyn LineApi>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            channels,
            media,
            broadcaster,
            line,
            provider_timeout,
        }
    }

    /// Handles one webhook delivery. Only a malformed envelope or a bad
    /// signature is an error; per-event failures are logged and counted so
    /// the provider still gets its 200.
    pub async fn handle_delivery(&self, body: &[u8], signature: Option<&str>) -> Result<IngestOutcome> {
        let envelope: WebhookEnvelope = serde_json::from_slice(body)
            .map_err(|e| Error::BadRequest(format!("Malformed webhook body: {}", e)))?;

        let Some(channel) = self.channels.find_by_destination(&envelope.destination).await? else {
            tracing::info!(destination = %envelope.destination, "webhook for unknown destination ignored");
            return Ok(IngestOutcome::UnknownDestination);
        };

        let signature = signature.ok_or(Error::InvalidSignature)?;
        if !verify_signature(body, signature, &channel.channel_secret) {
            tracing::warn!(channel_id = %channel.channel_id, "webhook signature mismatch");
            return Err(Error::InvalidSignature);
        }

        let mut report = IngestReport::default();
        for raw in &envelope.events {
            let Some(event) = InboundEvent::decode(raw) else {
                report.skipped += 1;
                continue;
            };
            match self.process_event(&channel, event).await {
                Ok(_) => report.stored += 1,
                Err(err) => {
                    tracing::error!(error = %err, channel_id = %channel.channel_id, "inbound event dropped");
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            channel_id = %channel.channel_id,
            stored = report.stored,
            skipped = report.skipped,
            failed = report.failed,
            "webhook delivery processed"
        );
        Ok(IngestOutcome::Processed(report))
    }

    pub async fn process_event(
        &self,
        channel: &ChannelAccount,
        event: InboundEvent,
    ) -> Result<StoredInbound> {
        let body = match event.content {
            InboundContent::Text { text } => MessageBody::Text { text },
            InboundContent::Sticker {
                package_id,
                sticker_id,
            } => MessageBody::Sticker {
                package_id,
                sticker_id,
            },
            InboundContent::Image { message_id } => MessageBody::Image {
                url: self.fetch_image(channel, &message_id).await?,
            },
            InboundContent::Follow => MessageBody::System {
                text: FOLLOW_TEXT.to_string(),
            },
        };

        let saved_file = match &body {
            MessageBody::Image { url } => Some(url.clone()),
            _ => None,
        };

        let profile = self.fetch_profile(channel, &event.sender_id).await;
        let stored = match self
            .store_inbound(channel, &event.sender_id, profile.as_ref(), body)
            .await
        {
            Ok(stored) => stored,
            Err(err) => {
                if let Some(url) = saved_file {
                    if let Err(io) = self.media.remove(&url).await {
                        tracing::warn!(error = %io, url = %url, "could not remove orphaned image");
                    }
                }
                return Err(err);
            }
        };

        for message in &stored.messages {
            let sent = match message.recipient_id {
                Some(staff_id) => self.broadcaster.notify_staff(staff_id, &stored.customer, message).await,
                None => self
                    .broadcaster
                    .notify_all_staff(&stored.customer, message)
                    .await
                    .map(|_| ()),
            };
            if let Err(err) = sent {
                tracing::warn!(error = %err, message_id = message.id, "realtime update failed");
            }
        }

        Ok(stored)
    }

    /// Resolves the sender and writes one row per staff recipient in a
    /// single transaction. Any failure rolls back the identity as well.
    pub async fn store_inbound(
        &self,
        channel: &ChannelAccount,
        sender_id: &str,
        profile: Option<&ProviderProfile>,
        body: MessageBody,
    ) -> Result<StoredInbound> {
        let mut tx = self.pool.begin().await?;

        let customer = resolve_customer(&mut tx, sender_id, profile).await?;
        let staff = list_staff(&mut tx).await?;
        let recipients: Vec<Option<i64>> = if staff.is_empty() {
            vec![None]
        } else {
            staff.iter().map(|s| Some(s.id)).collect()
        };

        let created_at = Utc::now();
        let mut messages = Vec::with_capacity(recipients.len());
        for recipient_id in recipients {
            let message = insert_message(
                &mut tx,
                &CreateMessage {
                    body: body.clone(),
                    sender_id: customer.id,
                    recipient_id,
                    channel_account_id: Some(channel.id),
                    is_read: false,
                    created_at,
                },
            )
            .await?;
            messages.push(message);
        }

        tx.commit().await?;

        tracing::debug!(
            customer_id = customer.id,
            kind = body.kind().as_str(),
            rows = messages.len(),
            "inbound message stored"
        );
        Ok(StoredInbound { customer, messages })
    }

    async fn fetch_profile(&self, channel: &ChannelAccount, sender_id: &str) -> Option<ProviderProfile> {
        let call = self.line.get_profile(&channel.access_token, sender_id);
        match with_timeout(self.provider_timeout, "profile fetch", call).await {
            Ok(profile) => Some(profile),
            Err(err) => {
                tracing::warn!(error = %err, sender_id, "profile fetch failed, using defaults");
                None
            }
        }
    }

    async fn fetch_image(&self, channel: &ChannelAccount, message_id: &str) -> Result<String> {
        let call = self.line.get_message_content(&channel.access_token, message_id);
        let data = with_timeout(self.provider_timeout, "content fetch", call).await?;
        self.media
            .save_image(&data, sniff_image_extension(&data))
            .await
    }
}
