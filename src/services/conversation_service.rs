use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::conversation::ConversationSummary;
use crate::models::message::MessageView;
use crate::models::user::User;
use crate::services::message_service::MessageService;

/// Read-side view over the messages table. Nothing here is cached; every
/// call recomputes from the store.
#[derive(Clone)]
pub struct ConversationService {
    pool: SqlitePool,
    messages: MessageService,
}

impl ConversationService {
    pub fn new(pool: SqlitePool, messages: MessageService) -> Self {
        Self { pool, messages }
    }

    pub async fn summary(&self, customer: &User, staff_id: i64) -> Result<ConversationSummary> {
        let last_message = self.messages.last_message(customer.id, staff_id).await?;
        let unread_count = self.messages.unread_count(customer.id, staff_id).await?;
        Ok(ConversationSummary {
            customer_id: customer.id,
            display_name: customer.username.clone(),
            picture_url: customer.picture_url.clone(),
            last_message: last_message.as_ref().map(MessageView::from),
            unread_count,
        })
    }

    /// Conversation list for one staff member, most recently active first.
    pub async fn list_for_staff(&self, staff_id: i64) -> Result<Vec<ConversationSummary>> {
        let customers = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            WHERE u.role = 'guest' AND u.line_user_id IS NOT NULL
            ORDER BY COALESCE(
                (SELECT MAX(m.created_at) FROM messages m
                 WHERE m.sender_id = u.id OR m.recipient_id = u.id),
                u.created_at
            ) DESC, u.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(customers.len());
        for customer in &customers {
            summaries.push(self.summary(customer, staff_id).await?);
        }
        Ok(summaries)
    }
}
