pub mod auth_service;
pub mod broadcast_service;
pub mod channel_service;
pub mod conversation_service;
pub mod identity_service;
pub mod ingest_service;
pub mod line_client;
pub mod media_service;
pub mod message_service;
pub mod quick_reply_service;
pub mod reply_service;
