use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    dto::console_dto::{CreateQuickReplyRequest, QuickReplyQuery},
    error::Result,
    AppState,
};

pub async fn list_quick_replies(
    State(state): State<AppState>,
    Query(query): Query<QuickReplyQuery>,
) -> Result<impl IntoResponse> {
    let items = state
        .quick_reply_service
        .list(query.channel_account_id)
        .await?;
    Ok(Json(items))
}

pub async fn create_quick_reply(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuickReplyRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let reply = state.quick_reply_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(reply)))
}

pub async fn delete_quick_reply(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.quick_reply_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
