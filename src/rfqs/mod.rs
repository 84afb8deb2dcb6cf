mod award;
mod create;
mod lifecycle;
mod list;
mod model;
mod respond;

use axum::{routing::{get, post}, Router};
use sqlx::SqlitePool;
use uuid::Uuid;

pub use model::{ResponseStatus, Rfq, RfqAction, RfqResponse, RfqStatus};

use crate::{auth::Role, directory, session::SessionUser, AppError, AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_rfqs).post(create::create_rfq))
        .route("/{id}", get(list::rfq).put(create::update_rfq))
        .route("/{id}/publish", post(lifecycle::publish))
        .route("/{id}/review", post(lifecycle::begin_review))
        .route("/{id}/close", post(lifecycle::close))
        .route("/{id}/responses", get(respond::list_responses).post(respond::respond))
        .route("/{id}/award", post(award::award))
}

pub(crate) async fn get_rfq(db_pool: &SqlitePool, id: Uuid) -> AppResult<Rfq> {
    sqlx::query_as::<_, Rfq>("SELECT * FROM rfqs WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound)
}

/// The caller's own RFQ. Brand role and ownership through the caller's brand profile.
async fn owned_rfq(db_pool: &SqlitePool, caller: &SessionUser, id: Uuid) -> AppResult<Rfq> {
    caller.require(&[Role::Brand])?;
    let rfq = get_rfq(db_pool, id).await?;

    let owner = directory::brand_for_user(db_pool, caller.id).await?;
    match owner {
        Some(brand) if brand.id == rfq.brand_id => Ok(rfq),
        _ => Err(AppError::Forbidden),
    }
}

async fn caller_brand_id(db_pool: &SqlitePool, caller: &SessionUser) -> AppResult<Option<Uuid>> {
    if caller.role != Role::Brand {
        return Ok(None);
    }
    Ok(directory::brand_for_user(db_pool, caller.id).await?.map(|brand| brand.id))
}

/// Drafts are private to their brand; everything else is visible to any signed-in user.
fn visible(rfq: &Rfq, caller: &SessionUser, caller_brand: Option<Uuid>) -> bool {
    caller.is_admin() || caller_brand == Some(rfq.brand_id) || rfq.status != RfqStatus::Draft
}
