mod model;

use axum::{debug_handler, extract::State, routing::{get, post}, Router};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

pub use model::{Project, ProjectStatus};

use crate::{
    auth::Role,
    directory,
    envelope::{ApiResponse, ApiResult},
    extract::{Json, Path},
    session::SessionUser,
    AppError, AppResult, AppState,
};

use model::StatusRequest;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_projects))
        .route("/{id}", get(project))
        .route("/{id}/status", post(update_status))
}

pub(crate) async fn get_project(db_pool: &SqlitePool, id: Uuid) -> AppResult<Project> {
    sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id=?")
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .ok_or(AppError::NotFound)
}

/// The profile through which the caller takes part in projects, if any.
enum Party {
    Brand(Uuid),
    Manufacturer(Uuid),
    Nobody,
}

async fn party(db_pool: &SqlitePool, caller: &SessionUser) -> AppResult<Party> {
    Ok(match caller.role {
        Role::Brand => directory::brand_for_user(db_pool, caller.id)
            .await?
            .map_or(Party::Nobody, |brand| Party::Brand(brand.id)),
        Role::Manufacturer => directory::manufacturer_for_user(db_pool, caller.id)
            .await?
            .map_or(Party::Nobody, |m| Party::Manufacturer(m.id)),
        _ => Party::Nobody,
    })
}

impl Party {
    fn takes_part_in(&self, project: &Project) -> bool {
        match self {
            Party::Brand(id) => *id == project.brand_id,
            Party::Manufacturer(id) => *id == project.manufacturer_id,
            Party::Nobody => false,
        }
    }
}

#[debug_handler(state = AppState)]
async fn list_projects(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
) -> ApiResult<Vec<Project>> {
    let projects = match party(&db_pool, &caller).await? {
        Party::Brand(id) => {
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE brand_id=? ORDER BY created_at DESC")
                .bind(id)
                .fetch_all(&db_pool)
                .await?
        }
        Party::Manufacturer(id) => {
            sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE manufacturer_id=? ORDER BY created_at DESC")
                .bind(id)
                .fetch_all(&db_pool)
                .await?
        }
        Party::Nobody if caller.is_admin() => {
            sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
                .fetch_all(&db_pool)
                .await?
        }
        Party::Nobody => Vec::new(),
    };

    Ok(ApiResponse::Ok(projects))
}

#[debug_handler(state = AppState)]
async fn project(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Project> {
    let project = get_project(&db_pool, id).await?;
    if !caller.is_admin() && !party(&db_pool, &caller).await?.takes_part_in(&project) {
        return Err(AppError::Forbidden);
    }
    Ok(ApiResponse::Ok(project))
}

#[debug_handler(state = AppState)]
async fn update_status(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
    Path(id): Path<Uuid>,
    Json(StatusRequest { status }): Json<StatusRequest>,
) -> ApiResult<Project> {
    caller.require(&[Role::Brand, Role::Manufacturer])?;

    let mut project = get_project(&db_pool, id).await?;
    if !party(&db_pool, &caller).await?.takes_part_in(&project) {
        return Err(AppError::Forbidden);
    }

    let now = OffsetDateTime::now_utc();
    project.status = project.status.move_to(status)?;
    project.updated_at = now;
    if project.status == ProjectStatus::Completed {
        project.completed_at = Some(now);
    }

    sqlx::query("UPDATE projects SET status=?,updated_at=?,completed_at=? WHERE id=?")
        .bind(project.status)
        .bind(project.updated_at)
        .bind(project.completed_at)
        .bind(project.id)
        .execute(&db_pool)
        .await?;

    tracing::info!(project_id = %project.id, status = %project.status, "project status changed");
    Ok(ApiResponse::Ok(project))
}
