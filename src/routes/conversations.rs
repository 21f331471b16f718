use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    error::Result, middleware::auth::CurrentStaff, models::message::MessageView, AppState,
};

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(CurrentStaff(staff)): Extension<CurrentStaff>,
) -> Result<impl IntoResponse> {
    let conversations = state.conversation_service.list_for_staff(staff.id).await?;
    Ok(Json(conversations))
}

/// Full history between the caller and one customer. Viewing it clears the
/// caller's unread badge for that customer.
pub async fn get_messages(
    State(state): State<AppState>,
    Extension(CurrentStaff(staff)): Extension<CurrentStaff>,
    Path(customer_id): Path<i64>,
) -> Result<impl IntoResponse> {
    let customer = state.identity_service.get_customer(customer_id).await?;
    let history = state
        .message_service
        .conversation(customer.id, staff.id)
        .await?;

    // Only what this response shows is marked; later arrivals stay unread.
    if let Some(through_id) = history.iter().map(|m| m.id).max() {
        let marked = state
            .message_service
            .mark_as_read(customer.id, staff.id, through_id)
            .await?;
        if marked > 0 {
            tracing::debug!(customer_id = customer.id, staff_id = staff.id, marked, "messages marked read");
        }
    }

    let views: Vec<MessageView> = history.iter().map(MessageView::from).collect();
    Ok(Json(views))
}
