mod model;

use axum::{debug_handler, extract::State, routing::post, Router};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

pub use model::{Ratings, Review};

use crate::{
    auth::Role,
    directory,
    envelope::{ApiResponse, ApiResult},
    extract::{Json, Path},
    projects::{self, ProjectStatus},
    session::SessionUser,
    AppError, AppResult, AppState,
};

use model::{ReplyRequest, ReviewRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_review))
        .route("/{id}/reply", post(reply))
}

#[debug_handler(state = AppState)]
async fn create_review(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Json(ReviewRequest { project_id, ratings, comment }): Json<ReviewRequest>,
) -> ApiResult<Review> {
    caller.require(&[Role::Brand])?;
    ratings.validate()?;

    let project = projects::get_project(&db_pool, project_id).await?;
    let brand = directory::brand_for_user(&db_pool, caller.id).await?;
    if brand.map(|b| b.id) != Some(project.brand_id) {
        return Err(AppError::Forbidden);
    }
    if project.status != ProjectStatus::Completed {
        return Err(AppError::validation("only completed projects can be reviewed"));
    }

    let review = Review {
        id: Uuid::now_v7(),
        project_id: project.id,
        brand_id: project.brand_id,
        manufacturer_id: project.manufacturer_id,
        quality_rating: ratings.quality,
        communication_rating: ratings.communication,
        timeliness_rating: ratings.timeliness,
        value_rating: ratings.value,
        overall_rating: ratings.overall(),
        comment: comment.trim().to_owned(),
        reply: None,
        replied_at: None,
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO reviews (id,project_id,brand_id,manufacturer_id,quality_rating,communication_rating,timeliness_rating,value_rating,overall_rating,comment,created_at) VALUES (?,?,?,?,?,?,?,?,?,?,?)")
        .bind(review.id)
        .bind(review.project_id)
        .bind(review.brand_id)
        .bind(review.manufacturer_id)
        .bind(review.quality_rating)
        .bind(review.communication_rating)
        .bind(review.timeliness_rating)
        .bind(review.value_rating)
        .bind(review.overall_rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .execute(&db_pool)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict("project already reviewed".into()),
            other => other,
        })?;

    tracing::info!(review_id = %review.id, manufacturer_id = %review.manufacturer_id, "review posted");
    Ok(ApiResponse::Created(review))
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_for_manufacturer(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Path(manufacturer_id): Path<Uuid>,
) -> ApiResult<Vec<Review>> {
    directory::get_manufacturer(&db_pool, manufacturer_id).await?;

    let reviews = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE manufacturer_id=? ORDER BY created_at DESC")
        .bind(manufacturer_id)
        .fetch_all(&db_pool)
        .await?;
    Ok(ApiResponse::Ok(reviews))
}

#[debug_handler(state = AppState)]
async fn reply(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
    Json(ReplyRequest { reply }): Json<ReplyRequest>,
) -> ApiResult<Review> {
    caller.require(&[Role::Manufacturer])?;

    let reply = reply.trim().to_owned();
    if reply.is_empty() {
        return Err(AppError::validation("reply cannot be empty"));
    }

    let mut review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id=?")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or(AppError::NotFound)?;

    let manufacturer = directory::manufacturer_for_user(&db_pool, caller.id).await?;
    if manufacturer.map(|m| m.id) != Some(review.manufacturer_id) {
        return Err(AppError::Forbidden);
    }
    if review.reply.is_some() {
        return Err(AppError::Conflict("review already has a reply".into()));
    }

    let replied_at = OffsetDateTime::now_utc();
    store_reply(&db_pool, review.id, &reply, replied_at).await?;

    review.reply = Some(reply);
    review.replied_at = Some(replied_at);
    Ok(ApiResponse::Ok(review))
}

/// Writes the reply unless one is already stored.
pub async fn store_reply(db_pool: &SqlitePool, review_id: Uuid, reply: &str, replied_at: OffsetDateTime) -> AppResult<()> {
    let stored = sqlx::query("UPDATE reviews SET reply=?,replied_at=? WHERE id=? AND reply IS NULL")
        .bind(reply)
        .bind(replied_at)
        .bind(review_id)
        .execute(db_pool)
        .await?;
    if stored.rows_affected() != 1 {
        return Err(AppError::Conflict("review already has a reply".into()));
    }
    Ok(())
}
