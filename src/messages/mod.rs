mod inbox;
mod msg;
mod ws;

use axum::{routing::{get, post}, Router};

pub use msg::Message;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(inbox::inbox).post(inbox::send))
        .route("/unread", get(inbox::unread_count))
        .route("/with/{user_id}", get(inbox::conversation))
        .route("/{id}/read", post(inbox::mark_read))
        .route("/ws", get(ws::messages_ws))
}
