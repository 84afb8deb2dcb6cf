use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::{
    envelope::{ApiResponse, ApiResult},
    extract::{Json, Path, Query},
    session::SessionUser,
    AppError, AppState,
};

use super::msg::{self, Message, SendMessageQuery};

#[derive(Debug, Deserialize)]
pub(crate) struct InboxQuery {
    #[serde(default)]
    unread: bool,
}

#[derive(Serialize)]
pub(crate) struct UnreadCount {
    unread: i64,
}

#[debug_handler(state = AppState)]
pub(crate) async fn send(
    State(db_pool): State<SqlitePool>,
    State(tx): State<broadcast::Sender<Message>>,
    caller: SessionUser,
    Json(query): Json<SendMessageQuery>,
) -> ApiResult<Message> {
    let message = msg::send_msg(&db_pool, &tx, caller.id, query).await?;
    Ok(ApiResponse::Created(message))
}

#[debug_handler(state = AppState)]
pub(crate) async fn inbox(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Query(InboxQuery { unread }): Query<InboxQuery>,
) -> ApiResult<Vec<Message>> {
    let sql = if unread {
        "SELECT * FROM messages WHERE recipient_id=? AND read_at IS NULL ORDER BY created_at DESC, id DESC"
    } else {
        "SELECT * FROM messages WHERE recipient_id=? ORDER BY created_at DESC, id DESC"
    };

    let messages = sqlx::query_as::<_, Message>(sql)
        .bind(caller.id)
        .fetch_all(&db_pool)
        .await?;
    Ok(ApiResponse::Ok(messages))
}

#[debug_handler(state = AppState)]
pub(crate) async fn conversation(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(other_id): Path<Uuid>,
) -> ApiResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages WHERE (sender_id=? AND recipient_id=?) OR (sender_id=? AND recipient_id=?) ORDER BY created_at, id",
    )
    .bind(caller.id)
    .bind(other_id)
    .bind(other_id)
    .bind(caller.id)
    .fetch_all(&db_pool)
    .await?;
    Ok(ApiResponse::Ok(messages))
}

#[debug_handler(state = AppState)]
pub(crate) async fn unread_count(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
) -> ApiResult<UnreadCount> {
    let (unread,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE recipient_id=? AND read_at IS NULL")
        .bind(caller.id)
        .fetch_one(&db_pool)
        .await?;
    Ok(ApiResponse::Ok(UnreadCount { unread }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn mark_read(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Message> {
    let mut message = sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE id=?")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or(AppError::NotFound)?;

    if message.recipient_id != caller.id {
        // senders can't mark their own messages, strangers can't see them at all
        return Err(if message.involves(caller.id) { AppError::Forbidden } else { AppError::NotFound });
    }

    if message.read_at.is_none() {
        let now = OffsetDateTime::now_utc();
        sqlx::query("UPDATE messages SET read_at=? WHERE id=?")
            .bind(now)
            .bind(message.id)
            .execute(&db_pool)
            .await?;
        message.read_at = Some(now);
    }

    Ok(ApiResponse::Ok(message))
}
