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
    AppError, AppResult, AppState, Markdown,
};

use super::CatalogQuery;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Resource {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub category: String,
    pub summary: String,
    pub body: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Searchable for Resource {
    fn haystacks(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.summary.as_str()]
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct NewResource {
    title: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    body: String,
}

const AUTHORS: &[Role] = &[Role::Admin, Role::Creator, Role::Designer, Role::FinancialInstitution];

async fn get_resource(db_pool: &SqlitePool, id: Uuid) -> AppResult<Resource> {
    sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound)
}

#[debug_handler(state = AppState)]
pub(crate) async fn list_resources(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Query(query): Query<CatalogQuery>,
) -> ApiResult<Vec<Resource>> {
    let filters = EqFilters::new().text("category", query.category.as_deref());
    let sql = filters.select("resources", "created_at DESC");

    let resources = filters
        .bind_all(sqlx::query_as::<_, Resource>(&sql))
        .fetch_all(&db_pool)
        .await?;
    Ok(ApiResponse::Ok(search(resources, query.q.as_deref())))
}

#[debug_handler(state = AppState)]
pub(crate) async fn resource(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Resource> {
    Ok(ApiResponse::Ok(get_resource(&db_pool, id).await?))
}

#[debug_handler(state = AppState)]
pub(crate) async fn view_resource(
    State(db_pool): State<SqlitePool>,
    _caller: SessionUser,
    Path(id): Path<Uuid>,
) -> AppResult<Markdown<String>> {
    Ok(Markdown(get_resource(&db_pool, id).await?.body))
}

#[debug_handler(state = AppState)]
pub(crate) async fn create_resource(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Json(NewResource { title, category, summary, body }): Json<NewResource>,
) -> ApiResult<Resource> {
    caller.require(AUTHORS)?;

    let title = title.trim().to_owned();
    if title.is_empty() {
        return Err(AppError::validation("title is required"));
    }

    let resource = Resource {
        id: Uuid::now_v7(),
        author_id: caller.id,
        title,
        category: category.trim().to_owned(),
        summary,
        body,
        created_at: OffsetDateTime::now_utc(),
    };

    sqlx::query("INSERT INTO resources (id,author_id,title,category,summary,body,created_at) VALUES (?,?,?,?,?,?,?)")
        .bind(resource.id)
        .bind(resource.author_id)
        .bind(&resource.title)
        .bind(&resource.category)
        .bind(&resource.summary)
        .bind(&resource.body)
        .bind(resource.created_at)
        .execute(&db_pool)
        .await?;

    Ok(ApiResponse::Created(resource))
}
