use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::user::User;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReplyRequest {
    pub user_id: i64,
    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    #[validate(length(max = 2000))]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStaffRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChannelRequest {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 64))]
    pub channel_id: String,
    #[validate(length(min = 1))]
    pub channel_secret: String,
    #[validate(length(min = 1))]
    pub access_token: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuickReplyRequest {
    #[validate(length(min = 1, max = 128))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    pub channel_account_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct QuickReplyQuery {
    pub channel_account_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub marker: String,
}
