pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    auth_service::AuthService, broadcast_service::BroadcastService,
    channel_service::ChannelService, conversation_service::ConversationService,
    identity_service::IdentityService, ingest_service::IngestService, line_client::LineApi,
    media_service::MediaService, message_service::MessageService,
    quick_reply_service::QuickReplyService, reply_service::ReplyService,
};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub auth_service: AuthService,
    pub identity_service: IdentityService,
    pub message_service: MessageService,
    pub conversation_service: ConversationService,
    pub channel_service: ChannelService,
    pub quick_reply_service: QuickReplyService,
    pub media_service: MediaService,
    pub broadcast_service: BroadcastService,
    pub ingest_service: IngestService,
    pub reply_service: ReplyService,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config, line: Arc<dyn LineApi>) -> Self {
        let identity_service = IdentityService::new(pool.clone());
        let message_service = MessageService::new(pool.clone());
        let conversation_service = ConversationService::new(pool.clone(), message_service.clone());
        let channel_service = ChannelService::new(pool.clone());
        let quick_reply_service = QuickReplyService::new(pool.clone());
        let media_service = MediaService::new(&config.uploads_dir);
        let auth_service = AuthService::new(
            identity_service.clone(),
            &config.jwt_secret,
            config.token_ttl_hours,
        );
        let broadcast_service =
            BroadcastService::new(identity_service.clone(), conversation_service.clone());
        let ingest_service = IngestService::new(
            pool.clone(),
            channel_service.clone(),
            media_service.clone(),
            broadcast_service.clone(),
            line.clone(),
            config.provider_timeout,
        );
        let reply_service = ReplyService::new(
            pool.clone(),
            identity_service.clone(),
            channel_service.clone(),
            message_service.clone(),
            broadcast_service.clone(),
            line,
            config.provider_timeout,
            config.public_base_url.clone(),
        );

        Self {
            pool,
            auth_service,
            identity_service,
            message_service,
            conversation_service,
            channel_service,
            quick_reply_service,
            media_service,
            broadcast_service,
            ingest_service,
            reply_service,
        }
    }
}
