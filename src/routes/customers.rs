use axum::{
    extract::{Path, State},
    Json,
};
use validator::Validate;

use crate::{
    dto::console_dto::UpdateCustomerRequest, error::Result, models::user::User, AppState,
};

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<Json<User>> {
    payload.validate()?;
    let customer = state
        .identity_service
        .update_customer_details(id, payload.phone, payload.note)
        .await?;
    Ok(Json(customer))
}
