use axum::{debug_handler, extract::State};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    auth::Role,
    envelope::{ApiResponse, ApiResult},
    extract::{Json, Path, Query},
    filter::{search, EqFilters, Searchable},
    session::SessionUser,
    AppError, AppState,
};

use super::CatalogQuery;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RawMaterial {
    pub id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    pub category: String,
    pub description: String,
    pub supplier_name: String,
    pub unit: String,
    pub price_per_unit: Option<f64>,
    pub min_order_quantity: Option<i64>,
    pub location: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Searchable for RawMaterial {
    fn haystacks(&self) -> Vec<&str> {
        vec![self.name.as_str(), self.description.as_str(), self.supplier_name.as_str()]
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewRawMaterial {
    name: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    supplier_name: String,
    unit: Option<String>,
    price_per_unit: Option<f64>,
    min_order_quantity: Option<i64>,
    #[serde(default)]
    location: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_raw_materials(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Vec<RawMaterial>> {
    let filters = EqFilters::new().text("category", query.category.as_deref());
    let sql = filters.select("raw_materials", "name");

    let materials = filters
        .bind_all(sqlx::query_as::<_, RawMaterial>(&sql))
        .fetch_all(&db_pool)
        .await?;
    Ok(ApiResponse::Ok(search(materials, query.q.as_deref())))
}

#[debug_handler(state = AppState)]
pub(crate) async fn raw_material(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<RawMaterial> {
    let material = sqlx::query_as::<_, RawMaterial>("SELECT * FROM raw_materials WHERE id=?")
        .bind(id)
        .fetch_optional(&db_pool)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(ApiResponse::Ok(material))
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_raw_material(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Json(new): Json<NewRawMaterial>,
) -> ApiResult<RawMaterial> {
    caller.require(&[Role::Admin, Role::Manufacturer])?;

    let name = new.name.trim().to_owned();
    if name.is_empty() {
        return Err(AppError::validation("name is required"));
    }
    if matches!(new.price_per_unit, Some(price) if price < 0.0) {
        return Err(AppError::validation("price_per_unit cannot be negative"));
    }
    if matches!(new.min_order_quantity, Some(moq) if moq <= 0) {
        return Err(AppError::validation("min_order_quantity must be positive"));
    }

    let material = RawMaterial {
        id: Uuid::now_v7(),
        created_by: caller.id,
        name,
        category: new.category.trim().to_owned(),
        description: new.description,
        supplier_name: new.supplier_name.trim().to_owned(),
        unit: new.unit.map(|u| u.trim().to_owned()).filter(|u| !u.is_empty()).unwrap_or_else(|| "unit".to_owned()),
        price_per_unit: new.price_per_unit,
        min_order_quantity: new.min_order_quantity,
        location: new.location.trim().to_owned(),
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO raw_materials (id,created_by,name,category,description,supplier_name,unit,price_per_unit,min_order_quantity,location,created_at) VALUES (?,?,?,?,?,?,?,?,?,?,?)")
        .bind(material.id)
        .bind(material.created_by)
        .bind(&material.name)
        .bind(&material.category)
        .bind(&material.description)
        .bind(&material.supplier_name)
        .bind(&material.unit)
        .bind(material.price_per_unit)
        .bind(material.min_order_quantity)
        .bind(&material.location)
        .bind(material.created_at)
        .execute(&db_pool)
        .await?;

    Ok(ApiResponse::Created(material))
}
