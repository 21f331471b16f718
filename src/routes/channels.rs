use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{dto::console_dto::CreateChannelRequest, error::Result, AppState};

pub async fn list_channels(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.channel_service.list().await?))
}

pub async fn create_channel(
    State(state): State<AppState>,
    Json(payload): Json<CreateChannelRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let channel = state.channel_service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(channel)))
}

pub async fn delete_channel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state.channel_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
