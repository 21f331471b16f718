use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    dto::console_dto::{LoginRequest, LoginResponse},
    error::Result,
    AppState,
};

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    payload.validate()?;
    let (token, user) = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(LoginResponse { token, user }))
}
