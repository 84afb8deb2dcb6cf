mod brands;
mod manufacturers;
mod model;

use axum::{routing::{get, post}, Router};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

pub use model::{Brand, Manufacturer, ManufacturerDetail, RatingSummary};
pub(crate) use brands::{brand_for_user, get_brand};
pub(crate) use manufacturers::{get_manufacturer, manufacturer_for_user};

use crate::{AppError, AppResult, AppState};

pub fn brands_router() -> Router<AppState> {
    Router::new()
        .route("/", get(brands::list_brands).post(brands::create_brand))
        .route("/{id}", get(brands::brand).put(brands::update_brand))
        .route("/{id}/verification", post(brands::verify_brand))
}

pub fn manufacturers_router() -> Router<AppState> {
    Router::new()
        .route("/", get(manufacturers::list_manufacturers).post(manufacturers::create_manufacturer))
        .route("/{id}", get(manufacturers::manufacturer).put(manufacturers::update_manufacturer))
        .route("/{id}/verification", post(manufacturers::verify_manufacturer))
        .route("/{id}/reviews", get(crate::reviews::list_for_manufacturer))
}

#[derive(Debug, Clone, Copy)]
enum ProfileKind {
    Brand,
    Manufacturer,
}

impl ProfileKind {
    fn table(self) -> &'static str {
        match self {
            ProfileKind::Brand => "brands",
            ProfileKind::Manufacturer => "manufacturers",
        }
    }
}

/// Admin verification toggle shared by both profile kinds.
async fn set_verified(db_pool: &SqlitePool, kind: ProfileKind, id: Uuid, verified: bool) -> AppResult<()> {
    let sql = format!("UPDATE {} SET verified=?,updated_at=? WHERE id=?", kind.table());
    let updated = sqlx::query(&sql)
        .bind(verified)
        .bind(OffsetDateTime::now_utc())
        .bind(id)
        .execute(db_pool)
        .await?;
    if updated.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(profile = kind.table(), profile_id = %id, verified, "profile verification changed");
    Ok(())
}
