use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Outer shape of a LINE webhook delivery. Events stay raw until the
/// signature has been checked against the destination's channel secret.
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub destination: String,
    #[serde(default)]
    pub events: Vec<JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message {
        message: EventMessage,
        source: EventSource,
    },
    Follow {
        source: EventSource,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EventMessage {
    Text {
        text: String,
    },
    Sticker {
        #[serde(rename = "packageId")]
        package_id: String,
        #[serde(rename = "stickerId")]
        sticker_id: String,
    },
    Image {
        id: String,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
pub struct EventSource {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// An event the console knows how to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender_id: String,
    pub content: InboundContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundContent {
    Text { text: String },
    Sticker { package_id: String, sticker_id: String },
    Image { message_id: String },
    Follow,
}

impl InboundEvent {
    /// Decodes one raw event. Events without a user source or with a type
    /// the console does not handle yield `None`.
    pub fn decode(raw: &JsonValue) -> Option<Self> {
        let event: WebhookEvent = match serde_json::from_value(raw.clone()) {
            Ok(event) => event,
            Err(err) => {
                tracing::debug!(error = %err, "skipping undecodable webhook event");
                return None;
            }
        };

        let (source, content) = match event {
            WebhookEvent::Message { message, source } => {
                let content = match message {
                    EventMessage::Text { text } => InboundContent::Text { text },
                    EventMessage::Sticker {
                        package_id,
                        sticker_id,
                    } => InboundContent::Sticker {
                        package_id,
                        sticker_id,
                    },
                    EventMessage::Image { id } => InboundContent::Image { message_id: id },
                    EventMessage::Unsupported => return None,
                };
                (source, content)
            }
            WebhookEvent::Follow { source } => (source, InboundContent::Follow),
            WebhookEvent::Unsupported => return None,
        };

        Some(Self {
            sender_id: source.user_id?,
            content,
        })
    }
}
