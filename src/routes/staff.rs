use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    dto::console_dto::CreateStaffRequest,
    error::{Error, Result},
    models::user::Role,
    AppState,
};

pub async fn list_staff(State(state): State<AppState>) -> Result<impl IntoResponse> {
    Ok(Json(state.identity_service.list_staff().await?))
}

pub async fn create_staff(
    State(state): State<AppState>,
    Json(payload): Json<CreateStaffRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let role = Role::parse(&payload.role)
        .filter(Role::is_staff)
        .ok_or_else(|| Error::BadRequest(format!("Unknown staff role: {}", payload.role)))?;
    let user = state
        .identity_service
        .create_staff(&payload.username, &payload.password, role)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}
