use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use validator::Validate;

use crate::{
    dto::console_dto::ReplyRequest, error::Result, middleware::auth::CurrentStaff,
    models::message::MessageView, AppState,
};

pub async fn send_reply(
    State(state): State<AppState>,
    Extension(CurrentStaff(staff)): Extension<CurrentStaff>,
    Json(payload): Json<ReplyRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let message = state
        .reply_service
        .send_reply(&staff, payload.user_id, &payload.message)
        .await?;
    Ok((StatusCode::CREATED, Json(MessageView::from(&message))))
}
