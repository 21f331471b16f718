pub mod auth;
pub mod channels;
pub mod conversations;
pub mod customers;
pub mod health;
pub mod messages;
pub mod quick_replies;
pub mod realtime;
pub mod staff;
pub mod uploads;
pub mod webhook;

use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::{
    middleware::{
        auth::{require_admin, require_staff},
        rate_limit::{limit_requests, RateLimiter},
    },
    services::media_service::UPLOADS_ROUTE,
    AppState,
};

/// Every route of the console. Process-wide layers (tracing, CORS, body
/// limit) are added by the binary.
pub fn router(state: AppState, webhook_rps: u32) -> Router {
    let webhook_api = Router::new()
        .route("/callback", post(webhook::handle_callback))
        .layer(from_fn_with_state(
            RateLimiter::per_second(webhook_rps),
            limit_requests,
        ));

    let public_api = Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/login", post(auth::login))
        .route("/ws", get(realtime::ws_handler));

    let staff_api = Router::new()
        .route("/api/conversations", get(conversations::list_conversations))
        .route(
            "/api/conversations/:customer_id/messages",
            get(conversations::get_messages),
        )
        .route("/api/messages/reply", post(messages::send_reply))
        .route("/api/customers/:id", patch(customers::update_customer))
        .route(
            "/api/quick-replies",
            get(quick_replies::list_quick_replies).post(quick_replies::create_quick_reply),
        )
        .route(
            "/api/quick-replies/:id",
            delete(quick_replies::delete_quick_reply),
        )
        .route("/api/uploads", post(uploads::upload_image))
        .route_layer(from_fn_with_state(state.clone(), require_staff));

    let admin_api = Router::new()
        .route(
            "/api/channels",
            get(channels::list_channels).post(channels::create_channel),
        )
        .route("/api/channels/:id", delete(channels::delete_channel))
        .route(
            "/api/staff",
            get(staff::list_staff).post(staff::create_staff),
        )
        .route_layer(from_fn_with_state(state.clone(), require_admin));

    let uploads_dir = state.media_service.root().to_path_buf();

    webhook_api
        .merge(public_api)
        .merge(staff_api)
        .merge(admin_api)
        .nest_service(UPLOADS_ROUTE, ServeDir::new(uploads_dir))
        .with_state(state)
}
