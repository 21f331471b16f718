use serde::{Deserialize, Serialize};

use crate::models::message::MessageView;

/// Conversation list entry as seen by one staff member. Always derived from
/// the messages table, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationSummary {
    pub customer_id: i64,
    pub display_name: String,
    pub picture_url: Option<String>,
    pub last_message: Option<MessageView>,
    pub unread_count: i64,
}
