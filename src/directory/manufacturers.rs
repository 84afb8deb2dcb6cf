use axum::{debug_handler, extract::State};
use sqlx::{types::Json as DbJson, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::Role,
    envelope::{ApiResponse, ApiResult},
    extract::{Json, Path, Query},
    filter::{search, EqFilters},
    session::SessionUser,
    AppError, AppResult, AppState,
};

use super::{
    model::{DirectoryQuery, Manufacturer, ManufacturerDetail, ProfileRequest, RatingSummary, VerificationRequest},
    set_verified, ProfileKind,
};

pub(crate) async fn get_manufacturer(db_pool: &SqlitePool, id: Uuid) -> AppResult<Manufacturer> {
    sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) async fn manufacturer_for_user(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<Manufacturer>> {
    Ok(sqlx::query_as::<_, Manufacturer>("SELECT * FROM manufacturers WHERE user_id=?")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?)
}

pub(crate) async fn rating_summary(db_pool: &SqlitePool, manufacturer_id: Uuid) -> AppResult<RatingSummary> {
    let (review_count, average_rating): (i64, Option<f64>) =
        sqlx::query_as("SELECT COUNT(*), AVG(overall_rating) FROM reviews WHERE manufacturer_id=?")
            .bind(manufacturer_id)
            .fetch_one(db_pool)
            .await?;
    Ok(RatingSummary { review_count, average_rating })
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_manufacturers(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<Vec<Manufacturer>> {
    let filters = EqFilters::new()
        .text("industry", query.industry.as_deref())
        .text("location", query.location.as_deref())
        .flag("verified", query.verified);
    let sql = filters.select("manufacturers", "name");

    let manufacturers = filters
        .bind_all(sqlx::query_as::<_, Manufacturer>(&sql))
        .fetch_all(&db_pool)
        .await?;

    Ok(ApiResponse::Ok(search(manufacturers, query.q.as_deref())))
}

#[debug_handler(state = AppState)]
pub(crate) async fn manufacturer(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<ManufacturerDetail> {
    let manufacturer = get_manufacturer(&db_pool, id).await?;
    let rating = rating_summary(&db_pool, manufacturer.id).await?;
    Ok(ApiResponse::Ok(ManufacturerDetail { manufacturer, rating }))
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_manufacturer(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Json(profile): Json<ProfileRequest>,
) -> ApiResult<Manufacturer> {
    caller.require(&[Role::Manufacturer])?;
    let profile = profile.validated()?;

    if manufacturer_for_user(&db_pool, caller.id).await?.is_some() {
        return Err(AppError::Conflict("manufacturer profile already exists".into()));
    }

    let now = OffsetDateTime::now_utc();
    let manufacturer = Manufacturer {
        id: Uuid::now_v7(),
        user_id: caller.id,
        name: profile.name,
        description: profile.description,
        industry: profile.industry,
        location: profile.location,
        website: profile.website,
        capabilities: DbJson(profile.capabilities),
        min_order_quantity: profile.min_order_quantity,
        verified: false,
        created_at: now,
        updated_at: now,
    };

    sqlx::query("INSERT INTO manufacturers (id,user_id,name,description,industry,location,website,capabilities,min_order_quantity,verified,created_at,updated_at) VALUES (?,?,?,?,?,?,?,?,?,?,?,?)")
        .bind(manufacturer.id)
        .bind(manufacturer.user_id)
        .bind(&manufacturer.name)
        .bind(&manufacturer.description)
        .bind(&manufacturer.industry)
        .bind(&manufacturer.location)
        .bind(&manufacturer.website)
        .bind(&manufacturer.capabilities)
        .bind(manufacturer.min_order_quantity)
        .bind(manufacturer.verified)
        .bind(manufacturer.created_at)
        .bind(manufacturer.updated_at)
        .execute(&db_pool)
        .await?;

    tracing::info!(manufacturer_id = %manufacturer.id, user_id = %caller.id, "created manufacturer profile");
    Ok(ApiResponse::Created(manufacturer))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_manufacturer(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
    Json(profile): Json<ProfileRequest>,
) -> ApiResult<Manufacturer> {
    let mut manufacturer = get_manufacturer(&db_pool, id).await?;
    if manufacturer.user_id != caller.id {
        return Err(AppError::Forbidden);
    }
    let profile = profile.validated()?;

    manufacturer.name = profile.name;
    manufacturer.description = profile.description;
    manufacturer.industry = profile.industry;
    manufacturer.location = profile.location;
    manufacturer.website = profile.website;
    manufacturer.capabilities = DbJson(profile.capabilities);
    manufacturer.min_order_quantity = profile.min_order_quantity;
    manufacturer.updated_at = OffsetDateTime::now_utc();

    sqlx::query("UPDATE manufacturers SET name=?,description=?,industry=?,location=?,website=?,capabilities=?,min_order_quantity=?,updated_at=? WHERE id=?")
        .bind(&manufacturer.name)
        .bind(&manufacturer.description)
        .bind(&manufacturer.industry)
        .bind(&manufacturer.location)
        .bind(&manufacturer.website)
        .bind(&manufacturer.capabilities)
        .bind(manufacturer.min_order_quantity)
        .bind(manufacturer.updated_at)
        .bind(manufacturer.id)
        .execute(&db_pool)
        .await?;

    Ok(ApiResponse::Ok(manufacturer))
}

#[debug_handler(state = AppState)]
pub(crate) async fn verify_manufacturer(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
    Json(VerificationRequest { verified }): Json<VerificationRequest>,
) -> ApiResult<Manufacturer> {
    caller.require(&[Role::Admin])?;
    set_verified(&db_pool, ProfileKind::Manufacturer, id, verified).await?;
    Ok(ApiResponse::Ok(get_manufacturer(&db_pool, id).await?))
}
