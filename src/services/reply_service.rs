use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{Error, Result};
use crate::models::message::{CreateMessage, Message, MessageBody};
use crate::models::user::User;
use crate::services::broadcast_service::BroadcastService;
use crate::services::channel_service::ChannelService;
use crate::services::identity_service::IdentityService;
use crate::services::line_client::{with_timeout, LineApi, OutboundMessage};
use crate::services::message_service::{insert_message, MessageService};
use crate::utils::markers::parse_reply;

/// Sends staff replies through the channel the customer last wrote on. The
/// row is written inside a transaction that only commits once the provider
/// has accepted the push.
#[derive(Clone)]
pub struct ReplyService {
    pool: SqlitePool,
    identities: IdentityService,
    channels: ChannelService,
    messages: MessageService,
    broadcaster: BroadcastService,
    line: Arc<dyn LineApi>,
    provider_timeout: Duration,
    public_base_url: String,
}

impl ReplyService {
    pub fn new(
        pool: SqlitePool,
        identities: IdentityService,
        channels: ChannelService,
        messages: MessageService,
        broadcaster: BroadcastService,
        line: Arc<dyn LineApi>,
        provider_timeout: Duration,
        public_base_url: String,
    ) -> Self {
        Self {
            pool,
            identities,
            channels,
            messages,
            broadcaster,
            line,
            provider_timeout,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn send_reply(&self, staff: &User, customer_id: i64, composed: &str) -> Result<Message> {
        if !staff.is_staff() {
            return Err(Error::Forbidden("Only staff can reply".into()));
        }
        let customer = self.identities.get_customer(customer_id).await?;
        let line_user_id = customer
            .line_user_id
            .clone()
            .ok_or_else(|| Error::BadRequest("Customer has no LINE account".into()))?;

        let channel_account_id = self
            .messages
            .latest_inbound_channel(customer.id)
            .await?
            .ok_or(Error::NoChannel(customer.id))?;
        let channel = self
            .channels
            .get(channel_account_id)
            .await?
            .ok_or(Error::NoChannel(customer.id))?;

        let body = parse_reply(composed);
        if let MessageBody::Text { text } = &body {
            if text.is_empty() {
                return Err(Error::BadRequest("Reply is empty".into()));
            }
        }
        let outbound = self.outbound_message(&body);

        // The push happens while the insert is pending, so a reply the
        // customer received always has a row unless the commit itself fails.
        let mut tx = self.pool.begin().await?;
        let message = insert_message(
            &mut tx,
            &CreateMessage {
                body,
                sender_id: staff.id,
                recipient_id: Some(customer.id),
                channel_account_id: Some(channel.id),
                is_read: true,
                created_at: Utc::now(),
            },
        )
        .await?;

        let push = self
            .line
            .push_message(&channel.access_token, &line_user_id, std::slice::from_ref(&outbound));
        if let Err(err) = with_timeout(self.provider_timeout, "push", push).await {
            tracing::warn!(error = %err, customer_id = customer.id, channel_id = %channel.channel_id, "reply push failed");
            tx.rollback().await?;
            return Err(err);
        }

        tx.commit().await.map_err(|err| {
            tracing::error!(error = %err, customer_id = customer.id, "reply pushed but commit failed");
            Error::from(err)
        })?;

        tracing::info!(
            message_id = message.id,
            staff_id = staff.id,
            customer_id = customer.id,
            channel_id = %channel.channel_id,
            "reply sent"
        );

        if let Err(err) = self.broadcaster.notify_all_staff(&customer, &message).await {
            tracing::warn!(error = %err, message_id = message.id, "realtime update failed");
        }

        Ok(message)
    }

    fn outbound_message(&self, body: &MessageBody) -> OutboundMessage {
        match body {
            MessageBody::Text { text } | MessageBody::System { text } => {
                OutboundMessage::Text { text: text.clone() }
            }
            MessageBody::Image { url } => {
                let absolute = if url.starts_with("http://") || url.starts_with("https://") {
                    url.clone()
                } else {
                    format!("{}/{}", self.public_base_url, url.trim_start_matches('/'))
                };
                OutboundMessage::Image {
                    original_content_url: absolute.clone(),
                    preview_image_url: absolute,
                }
            }
            MessageBody::Sticker {
                package_id,
                sticker_id,
            } => OutboundMessage::Sticker {
                package_id: package_id.clone(),
                sticker_id: sticker_id.clone(),
            },
        }
    }
}
