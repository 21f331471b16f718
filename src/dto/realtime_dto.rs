use serde::{Deserialize, Serialize};

use crate::models::{conversation::ConversationSummary, message::MessageView};

pub const UPDATE_CHAT_EVENT: &str = "update_chat";

/// Incremental view update for one staff member. Carries data only; the
/// dashboard renders the list entry and bubble itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatUpdate {
    /// The customer whose conversation changed.
    pub user_id: i64,
    /// The staff member this update is addressed to.
    pub recipient_id: i64,
    pub conversation: ConversationSummary,
    pub message: MessageView,
}

#[derive(Debug, Serialize)]
pub struct RealtimeFrame<'a> {
    pub event: &'static str,
    pub data: &'a ChatUpdate,
}

impl ChatUpdate {
    pub fn to_frame(&self) -> serde_json::Result<String> {
        serde_json::to_string(&RealtimeFrame {
            event: UPDATE_CHAT_EVENT,
            data: self,
        })
    }
}
