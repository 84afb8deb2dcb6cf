use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{auth, AppError, AppResult};

pub const MAX_BODY_LEN: usize = 10_000;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub read_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Message {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SendMessageQuery {
    pub(crate) recipient_id: Uuid,
    pub(crate) body: String,
}

/// Stores the message and fans it out to connected sockets.
pub(crate) async fn send_msg(
    db_pool: &SqlitePool,
    tx: &broadcast::Sender<Message>,

    sender_id: Uuid,

    SendMessageQuery { recipient_id, body }: SendMessageQuery,
) -> AppResult<Message> {
    let body = body.trim().to_owned();
    if body.is_empty() {
        return Err(AppError::validation("message body cannot be empty"));
    }
    if body.chars().count() > MAX_BODY_LEN {
        return Err(AppError::validation(format!("message body is limited to {MAX_BODY_LEN} characters")));
    }
    if recipient_id == sender_id {
        return Err(AppError::validation("cannot message yourself"));
    }
    if auth::find_user(db_pool, recipient_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let message = Message {
        id: Uuid::now_v7(),
        sender_id,
        recipient_id,
        body,
        read_at: None,
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO messages (id,sender_id,recipient_id,body,created_at) VALUES (?,?,?,?,?)")
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.body)
        .bind(message.created_at)
        .execute(db_pool)
        .await?;

    // no subscribers is fine
    let _ = tx.send(message.clone());

    Ok(message)
}
