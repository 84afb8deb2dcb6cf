use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
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

use super::{
    caller_brand_id, get_rfq,
    model::{RespondRequest, ResponseStatus, RfqResponse},
    Rfq, RfqAction, RfqStatus,
};

#[debug_handler(state = AppState)]
pub(crate) async fn respond(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(rfq_id): Path<Uuid>,
    Json(request): Json<RespondRequest>,
) -> ApiResult<RfqResponse> {
    caller.require(&[Role::Manufacturer])?;
    let request = request.validated()?;

    let Some(manufacturer) = directory::manufacturer_for_user(&db_pool, caller.id).await? else {
        return Err(AppError::validation("create a manufacturer profile before responding"));
    };

    let mut tx = db_pool.begin().await?;

    let rfq = sqlx::query_as::<_, Rfq>("SELECT * FROM rfqs WHERE id=?")
        .bind(rfq_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound)?;
    rfq.status.apply(RfqAction::Respond)?;

    let response = RfqResponse {
        id: Uuid::now_v7(),
        rfq_id: rfq.id,
        manufacturer_id: manufacturer.id,
        price: request.price,
        lead_time_days: request.lead_time_days,
        message: request.message,
        status: ResponseStatus::Submitted,
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO rfq_responses (id,rfq_id,manufacturer_id,price,lead_time_days,message,status,created_at) VALUES (?,?,?,?,?,?,?,?)")
        .bind(response.id)
        .bind(response.rfq_id)
        .bind(response.manufacturer_id)
        .bind(response.price)
        .bind(response.lead_time_days)
        .bind(&response.message)
        .bind(response.status)
        .bind(response.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict("already responded to this rfq".into()),
            other => other,
        })?;

    let bumped = sqlx::query("UPDATE rfqs SET response_count=response_count+1,updated_at=? WHERE id=? AND status=?")
        .bind(response.created_at)
        .bind(rfq.id)
        .bind(RfqStatus::Active)
        .execute(&mut *tx)
        .await?;
    if bumped.rows_affected() != 1 {
        return Err(AppError::InvalidTransition("rfq stopped accepting responses".into()));
    }

    tx.commit().await?;

    tracing::info!(rfq_id = %rfq.id, manufacturer_id = %manufacturer.id, "rfq response submitted");
    Ok(ApiResponse::Created(response))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_responses(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(rfq_id): Path<Uuid>,
) -> ApiResult<Vec<RfqResponse>> {
    let rfq = get_rfq(&db_pool, rfq_id).await?;

    let responses = match caller.role {
        Role::Admin => all_responses(&db_pool, rfq.id).await?,
        Role::Brand => {
            if caller_brand_id(&db_pool, &caller).await? != Some(rfq.brand_id) {
                return Err(AppError::Forbidden);
            }
            all_responses(&db_pool, rfq.id).await?
        }
        Role::Manufacturer => {
            let Some(manufacturer) = directory::manufacturer_for_user(&db_pool, caller.id).await? else {
                return Ok(ApiResponse::Ok(Vec::new()));
            };
            sqlx::query_as::<_, RfqResponse>("SELECT * FROM rfq_responses WHERE rfq_id=? AND manufacturer_id=?")
                .bind(rfq.id)
                .bind(manufacturer.id)
                .fetch_all(&db_pool)
                .await?
        }
        _ => return Err(AppError::Forbidden),
    };

    Ok(ApiResponse::Ok(responses))
}

async fn all_responses(db_pool: &SqlitePool, rfq_id: Uuid) -> Result<Vec<RfqResponse>, sqlx::Error> {
    sqlx::query_as::<_, RfqResponse>("SELECT * FROM rfq_responses WHERE rfq_id=? ORDER BY created_at")
        .bind(rfq_id)
        .fetch_all(db_pool)
        .await
}
