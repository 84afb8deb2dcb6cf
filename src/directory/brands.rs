use axum::{debug_handler, extract::State};
use sqlx::SqlitePool;
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
    model::{Brand, DirectoryQuery, ProfileRequest, VerificationRequest},
    set_verified, ProfileKind,
};

pub(crate) async fn get_brand(db_pool: &SqlitePool, id: Uuid) -> AppResult<Brand> {
    sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound)
}

pub(crate) async fn brand_for_user(db_pool: &SqlitePool, user_id: Uuid) -> AppResult<Option<Brand>> {
    Ok(sqlx::query_as::<_, Brand>("SELECT * FROM brands WHERE user_id=?")
        .bind(user_id)
        .fetch_optional(db_pool)
        .await?)
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_brands(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Query(query): Query<DirectoryQuery>,
) -> ApiResult<Vec<Brand>> {
    let filters = EqFilters::new()
        .text("industry", query.industry.as_deref())
        .text("location", query.location.as_deref())
        .flag("verified", query.verified);
    let sql = filters.select("brands", "name");

    let brands = filters
        .bind_all(sqlx::query_as::<_, Brand>(&sql))
        .fetch_all(&db_pool)
        .await?;

    Ok(ApiResponse::Ok(search(brands, query.q.as_deref())))
}

#[debug_handler(state = AppState)]
pub(crate) async fn brand(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Brand> {
    Ok(ApiResponse::Ok(get_brand(&db_pool, id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_brand(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Json(profile): Json<ProfileRequest>,
) -> ApiResult<Brand> {
    caller.require(&[Role::Brand])?;
    let profile = profile.validated()?;

    if brand_for_user(&db_pool, caller.id).await?.is_some() {
        return Err(AppError::Conflict("brand profile already exists".into()));
    }

    let now = OffsetDateTime::now_utc();
    let brand = Brand {
        id: Uuid::now_v7(),
        user_id: caller.id,
        name: profile.name,
        description: profile.description,
        industry: profile.industry,
        location: profile.location,
        website: profile.website,
        verified: false,
        created_at: now,
        updated_at: now,
    };

    sqlx::query("INSERT INTO brands (id,user_id,name,description,industry,location,website,verified,created_at,updated_at) VALUES (?,?,?,?,?,?,?,?,?,?)")
        .bind(brand.id)
        .bind(brand.user_id)
        .bind(&brand.name)
        .bind(&brand.description)
        .bind(&brand.industry)
        .bind(&brand.location)
        .bind(&brand.website)
        .bind(brand.verified)
        .bind(brand.created_at)
        .bind(brand.updated_at)
        .execute(&db_pool)
        .await?;

    tracing::info!(brand_id = %brand.id, user_id = %caller.id, "created brand profile");
    Ok(ApiResponse::Created(brand))
}

#[debug_handler(state = AppState)]
pub(crate) async fn update_brand(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
    Json(profile): Json<ProfileRequest>,
) -> ApiResult<Brand> {
    let mut brand = get_brand(&db_pool, id).await?;
    if brand.user_id != caller.id {
        return Err(AppError::Forbidden);
    }
    let profile = profile.validated()?;

    brand.name = profile.name;
    brand.description = profile.description;
    brand.industry = profile.industry;
    brand.location = profile.location;
    brand.website = profile.website;
    brand.updated_at = OffsetDateTime::now_utc();

    sqlx::query("UPDATE brands SET name=?,description=?,industry=?,location=?,website=?,updated_at=? WHERE id=?")
        .bind(&brand.name)
        .bind(&brand.description)
        .bind(&brand.industry)
        .bind(&brand.location)
        .bind(&brand.website)
        .bind(brand.updated_at)
        .bind(brand.id)
        .execute(&db_pool)
        .await?;

    Ok(ApiResponse::Ok(brand))
}

#[debug_handler(state = AppState)]
pub(crate) async fn verify_brand(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
    Json(VerificationRequest { verified }): Json<VerificationRequest>,
) -> ApiResult<Brand> {
    caller.require(&[Role::Admin])?;
    set_verified(&db_pool, ProfileKind::Brand, id, verified).await?;
    Ok(ApiResponse::Ok(get_brand(&db_pool, id).await?))
}
