use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    envelope::{ApiResponse, ApiResult},
    extract::{Json, Path},
    projects::{Project, ProjectStatus},
    session::SessionUser,
    AppError, AppState,
};

use super::{
    model::{AwardRequest, ResponseStatus, RfqResponse},
    owned_rfq, Rfq, RfqAction,
};

/// Awards one response and opens the project for it, atomically.
#[debug_handler(state = AppState)]
pub(crate) async fn award(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(rfq_id): Path<Uuid>,
    Json(AwardRequest { response_id }): Json<AwardRequest>,
) -> ApiResult<Project> {
    // ownership first, outside the transaction
    owned_rfq(&db_pool, &caller, rfq_id).await?;

    let mut tx = db_pool.begin().await?;

    let mut rfq = sqlx::query_as::<_, Rfq>("SELECT * FROM rfqs WHERE id=?")
        .bind(rfq_id)
        .fetch_one(&mut *tx)
        .await?;
    let next = rfq.status.apply(RfqAction::Award)?;

    let response = sqlx::query_as::<_, RfqResponse>("SELECT * FROM rfq_responses WHERE id=? AND rfq_id=?")
        .bind(response_id)
        .bind(rfq.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::validation("response does not belong to this rfq"))?;

    let now = OffsetDateTime::now_utc();
    rfq.status = next;
    rfq.awarded_response_id = Some(response.id);
    rfq.updated_at = now;

    sqlx::query("UPDATE rfqs SET status=?,awarded_response_id=?,updated_at=? WHERE id=?")
        .bind(rfq.status)
        .bind(rfq.awarded_response_id)
        .bind(rfq.updated_at)
        .bind(rfq.id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE rfq_responses SET status=CASE WHEN id=? THEN ? ELSE ? END WHERE rfq_id=?")
        .bind(response.id)
        .bind(ResponseStatus::Accepted)
        .bind(ResponseStatus::Rejected)
        .bind(rfq.id)
        .execute(&mut *tx)
        .await?;

    let project = Project {
        id: Uuid::now_v7(),
        rfq_id: rfq.id,
        response_id: response.id,
        brand_id: rfq.brand_id,
        manufacturer_id: response.manufacturer_id,
        title: rfq.title.clone(),
        agreed_price: response.price,
        status: ProjectStatus::InProgress,
        created_at: now,
        updated_at: now,
        completed_at: None,
    };

    // rfq_id is unique on projects, a racing second award fails here
    sqlx::query("INSERT INTO projects (id,rfq_id,response_id,brand_id,manufacturer_id,title,agreed_price,status,created_at,updated_at) VALUES (?,?,?,?,?,?,?,?,?,?)")
        .bind(project.id)
        .bind(project.rfq_id)
        .bind(project.response_id)
        .bind(project.brand_id)
        .bind(project.manufacturer_id)
        .bind(&project.title)
        .bind(project.agreed_price)
        .bind(project.status)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(rfq_id = %rfq.id, response_id = %response.id, project_id = %project.id, "rfq awarded");
    Ok(ApiResponse::Created(project))
}
