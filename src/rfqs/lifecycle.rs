use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    envelope::{ApiResponse, ApiResult},
    extract::Path,
    session::SessionUser,
    AppResult, AppState,
};

use super::{owned_rfq, Rfq, RfqAction};

/// Moves the caller's RFQ along the lifecycle. Concurrent transitions are last-write-wins.
async fn transition(db_pool: &SqlitePool, caller: &SessionUser, id: Uuid, action: RfqAction) -> AppResult<Rfq> {
    let mut rfq = owned_rfq(db_pool, caller, id).await?;
    let next = rfq.status.apply(action)?;

    tracing::info!(rfq_id = %rfq.id, from = %rfq.status, to = %next, "rfq transition");
    rfq.status = next;
    rfq.updated_at = OffsetDateTime::now_utc();

    sqlx::query("UPDATE rfqs SET status=?,updated_at=? WHERE id=?")
        .bind(rfq.status)
        .bind(rfq.updated_at)
        .bind(rfq.id)
        .execute(db_pool)
        .await?;

    Ok(rfq)
}

#[debug_handler(state = AppState)]
pub(crate) async fn publish(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Rfq> {
    Ok(ApiResponse::Ok(transition(&db_pool, &caller, id, RfqAction::Publish).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn begin_review(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Rfq> {
    Ok(ApiResponse::Ok(transition(&db_pool, &caller, id, RfqAction::BeginReview).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn close(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Rfq> {
    Ok(ApiResponse::Ok(transition(&db_pool, &caller, id, RfqAction::Close).await?))
}
