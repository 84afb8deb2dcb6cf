use axum::{
    debug_handler,
    extract::{ws::{Message as Frame, WebSocket}, State, WebSocketUpgrade},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tokio::sync::broadcast;

use crate::{session::SessionUser, AppState};

use super::msg::{self, Message};

/// Pushes every new message addressed to the caller; incoming frames are sent as messages.
#[debug_handler(state = AppState)]
pub(crate) async fn messages_ws(
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<Message>>,
    caller: SessionUser,

    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| relay(socket, db_pool, tx, caller))
}

async fn relay(socket: WebSocket, db_pool: SqlitePool, tx: broadcast::Sender<Message>, caller: SessionUser) {
    let mut rx = tx.subscribe();
    let (mut sender, mut receiver) = socket.split();

    let mut push_task = tokio::spawn(async move {
        loop {
            let message = match rx.recv().await {
                Ok(message) => message,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(user_id = %caller.id, skipped, "message socket lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if message.recipient_id != caller.id {
                continue;
            }
            let Ok(json) = serde_json::to_string(&message) else {
                continue;
            };
            if sender.send(Frame::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut send_task = tokio::spawn(async move {
        while let Some(Ok(frame)) = receiver.next().await {
            if matches!(frame, Frame::Close(_)) {
                break;
            }
            let Ok(query) = serde_json::from_slice(&frame.into_data()) else {
                continue;
            };
            if let Err(err) = msg::send_msg(&db_pool, &tx, caller.id, query).await {
                tracing::debug!(user_id = %caller.id, error = %err, "dropped socket message");
            }
        }
    });

    tokio::select! {
        _ = &mut push_task => send_task.abort(),
        _ = &mut send_task => push_task.abort(),
    };
}
