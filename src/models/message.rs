use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
    Sticker,
    System,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Sticker => "sticker",
            MessageKind::System => "system",
        }
    }
}

/// A stored message. Everything except `is_read` is immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub text: Option<String>,
    pub kind: String,
    pub media_url: Option<String>,
    pub sticker_id: Option<String>,
    pub package_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub sender_id: i64,
    pub recipient_id: Option<i64>,
    pub channel_account_id: Option<i64>,
}

/// Payload of a message. Exactly one of text, media or sticker is carried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Text { text: String },
    Image { url: String },
    Sticker { package_id: String, sticker_id: String },
    System { text: String },
}

impl MessageBody {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageBody::Text { .. } => MessageKind::Text,
            MessageBody::Image { .. } => MessageKind::Image,
            MessageBody::Sticker { .. } => MessageKind::Sticker,
            MessageBody::System { .. } => MessageKind::System,
        }
    }

    /// Short text used for conversation list previews and logs.
    pub fn preview(&self) -> String {
        match self {
            MessageBody::Text { text } | MessageBody::System { text } => text.clone(),
            MessageBody::Image { .. } => "[image]".to_string(),
            MessageBody::Sticker { .. } => "[sticker]".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateMessage {
    pub body: MessageBody,
    pub sender_id: i64,
    pub recipient_id: Option<i64>,
    pub channel_account_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn body(&self) -> MessageBody {
        match self.kind.as_str() {
            "image" => MessageBody::Image {
                url: self.media_url.clone().unwrap_or_default(),
            },
            "sticker" => MessageBody::Sticker {
                package_id: self.package_id.clone().unwrap_or_default(),
                sticker_id: self.sticker_id.clone().unwrap_or_default(),
            },
            "system" => MessageBody::System {
                text: self.text.clone().unwrap_or_default(),
            },
            _ => MessageBody::Text {
                text: self.text.clone().unwrap_or_default(),
            },
        }
    }
}

/// Message as handed to the dashboard and the realtime channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageView {
    pub id: i64,
    #[serde(flatten)]
    pub body: MessageBody,
    pub sender_id: i64,
    pub recipient_id: Option<i64>,
    pub channel_account_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Message> for MessageView {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            body: message.body(),
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            channel_account_id: message.channel_account_id,
            is_read: message.is_read,
            created_at: message.created_at,
        }
    }
}
