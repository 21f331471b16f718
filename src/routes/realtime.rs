use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::{error::Result, models::user::User, AppState};

#[derive(Debug, Deserialize)]
pub struct SocketAuth {
    pub token: String,
}

/// Staff realtime feed. Browsers cannot set headers on the upgrade request,
/// so the bearer token travels in the query string.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(auth): Query<SocketAuth>,
) -> Result<impl IntoResponse> {
    let claims = state.auth_service.verify(&auth.token)?;
    let staff = state.auth_service.current_staff(&claims).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, staff)))
}

async fn handle_socket(socket: WebSocket, state: AppState, staff: User) {
    let mut updates = state.broadcast_service.subscribe();
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let staff_id = staff.id;
    tracing::info!(staff_id, "realtime session opened");

    let mut send_task = tokio::spawn(async move {
        loop {
            let update = match updates.recv().await {
                Ok(update) => update,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(staff_id, skipped, "realtime session lagging, updates dropped");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            if update.recipient_id != staff_id {
                continue;
            }
            let frame = match update.to_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::error!(error = %err, "failed to encode realtime frame");
                    continue;
                }
            };
            if ws_sender.send(Message::Text(frame)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = ws_receiver.next().await {
            if let Message::Close(_) = message {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }
    tracing::info!(staff_id, "realtime session closed");
}
