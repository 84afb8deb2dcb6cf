use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    auth::Role,
    envelope::{ApiResponse, ApiResult},
    extract::{Path, Query},
    filter::{search, EqFilters},
    session::SessionUser,
    AppError, AppState,
};

use super::{caller_brand_id, get_rfq, model::RfqQuery, visible, Rfq};

#[debug_handler(state = AppState)]
pub(crate) async fn list_rfqs(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Query(query): Query<RfqQuery>,
) -> ApiResult<Vec<Rfq>> {
    let caller_brand = caller_brand_id(&db_pool, &caller).await?;
    if caller.role == Role::Brand && caller_brand.is_none() {
        return Ok(ApiResponse::Ok(Vec::new()));
    }

    // brands work from their own rfqs
    let filters = EqFilters::new()
        .id("brand_id", caller_brand)
        .text("status", query.status.as_ref().map(|s| s.as_str()))
        .text("category", query.category.as_deref());
    let sql = filters.select("rfqs", "created_at DESC");

    let mut rfqs = filters
        .bind_all(sqlx::query_as::<_, Rfq>(&sql))
        .fetch_all(&db_pool)
        .await?;
    rfqs.retain(|rfq| visible(rfq, &caller, caller_brand));

    Ok(ApiResponse::Ok(search(rfqs, query.q.as_deref())))
}

#[debug_handler(state = AppState)]
pub(crate) async fn rfq(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Rfq> {
    let rfq = get_rfq(&db_pool, id).await?;
    let caller_brand = caller_brand_id(&db_pool, &caller).await?;

    // hidden drafts look the same as missing ones
    if !visible(&rfq, &caller, caller_brand) {
        return Err(AppError::NotFound);
    }
    Ok(ApiResponse::Ok(rfq))
}
