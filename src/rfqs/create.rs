use axum::{debug_handler, extract::State};
use sqlx::{types::Json as DbJson, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::Role,
    directory,
    envelope::{ApiResponse, ApiResult},
    extract::{Json, Path},
    session::SessionUser,
    AppError, AppState,
};

use super::{model::RfqRequest, owned_rfq, Rfq, RfqStatus};

#[debug_handler(state = AppState)]
pub(crate) async fn create_rfq(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Json(request): Json<RfqRequest>,
) -> ApiResult<Rfq> {
    caller.require(&[Role::Brand])?;
    let request = request.validated()?;

    let Some(brand) = directory::brand_for_user(&db_pool, caller.id).await? else {
        return Err(AppError::validation("create a brand profile before posting rfqs"));
    };

    let now = OffsetDateTime::now_utc();
    let rfq = Rfq {
        id: Uuid::now_v7(),
        brand_id: brand.id,
        title: request.title,
        description: request.description,
        category: request.category,
        status: RfqStatus::Draft,
        budget: request.budget,
        quantity: request.quantity,
        timeline: request.timeline,
        requirements: DbJson(request.requirements),
        response_count: 0,
        awarded_response_id: None,
        created_at: now,
        updated_at: now,
    };

    sqlx::query("INSERT INTO rfqs (id,brand_id,title,description,category,status,budget,quantity,timeline,requirements,response_count,created_at,updated_at) VALUES (?,?,?,?,?,?,?,?,?,?,?,?,?)")
        .bind(rfq.id)
        .bind(rfq.brand_id)
        .bind(&rfq.title)
        .bind(&rfq.description)
        .bind(&rfq.category)
        .bind(rfq.status)
        .bind(rfq.budget)
        .bind(rfq.quantity)
        .bind(&rfq.timeline)
        .bind(&rfq.requirements)
        .bind(rfq.response_count)
        .bind(rfq.created_at)
        .bind(rfq.updated_at)
        .execute(&db_pool)
        .await?;

    tracing::info!(rfq_id = %rfq.id, brand_id = %brand.id, "created rfq");
    Ok(ApiResponse::Created(rfq))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_rfq(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
    Json(request): Json<RfqRequest>,
) -> ApiResult<Rfq> {
    let mut rfq = owned_rfq(&db_pool, &caller, id).await?;
    if rfq.status != RfqStatus::Draft {
        return Err(AppError::InvalidTransition(format!("only drafts can be edited, rfq is {}", rfq.status)));
    }
    let request = request.validated()?;

    rfq.title = request.title;
    rfq.description = request.description;
    rfq.category = request.category;
    rfq.budget = request.budget;
    rfq.quantity = request.quantity;
    rfq.timeline = request.timeline;
    rfq.requirements = DbJson(request.requirements);
    rfq.updated_at = OffsetDateTime::now_utc();

    sqlx::query("UPDATE rfqs SET title=?,description=?,category=?,budget=?,quantity=?,timeline=?,requirements=?,updated_at=? WHERE id=?")
        .bind(&rfq.title)
        .bind(&rfq.description)
        .bind(&rfq.category)
        .bind(rfq.budget)
        .bind(rfq.quantity)
        .bind(&rfq.timeline)
        .bind(&rfq.requirements)
        .bind(rfq.updated_at)
        .bind(rfq.id)
        .execute(&db_pool)
        .await?;

    Ok(ApiResponse::Ok(rfq))
}
