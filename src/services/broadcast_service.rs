use tokio::sync::broadcast;

use crate::dto::realtime_dto::ChatUpdate;
use crate::error::Result;
use crate::models::message::{Message, MessageView};
use crate::models::user::User;
use crate::services::conversation_service::ConversationService;
use crate::services::identity_service::IdentityService;

const CHANNEL_CAPACITY: usize = 256;

/// Fans conversation changes out to connected staff sessions. Delivery is
/// fire-and-forget: an update nobody is listening for is dropped.
#[derive(Clone)]
pub struct BroadcastService {
    identities: IdentityService,
    conversations: ConversationService,
    sender: broadcast::Sender<ChatUpdate>,
}

impl BroadcastService {
    pub fn new(identities: IdentityService, conversations: ConversationService) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            identities,
            conversations,
            sender,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatUpdate> {
        self.sender.subscribe()
    }

    /// Recomputes the staff member's view of the conversation and emits one
    /// update carrying it and the triggering message.
    pub async fn notify_staff(&self, staff_id: i64, customer: &User, message: &Message) -> Result<()> {
        let conversation = self.conversations.summary(customer, staff_id).await?;
        let update = ChatUpdate {
            user_id: customer.id,
            recipient_id: staff_id,
            conversation,
            message: MessageView::from(message),
        };
        if self.sender.send(update).is_err() {
            tracing::debug!(staff_id, customer_id = customer.id, "no realtime sessions connected");
        }
        Ok(())
    }

    pub async fn notify_all_staff(&self, customer: &User, message: &Message) -> Result<usize> {
        let staff = self.identities.list_staff().await?;
        for member in &staff {
            self.notify_staff(member.id, customer, message).await?;
        }
        Ok(staff.len())
    }
}
