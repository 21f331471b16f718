pub mod channel_account;
pub mod conversation;
pub mod message;
pub mod quick_reply;
pub mod user;
