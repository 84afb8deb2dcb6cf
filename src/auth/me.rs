use axum::{debug_handler, extract::State};
use serde::Serialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    directory,
    envelope::{ApiResponse, ApiResult},
    session::SessionUser,
    AppError, AppState,
};

use super::{user, PublicUser};

#[derive(Serialize)]
pub(crate) struct Me {
    user: PublicUser,
    brand_id: Option<Uuid>,
    manufacturer_id: Option<Uuid>,
}

#[debug_handler(state = AppState)]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    caller: SessionUser,
) -> ApiResult<Me> {
    // a deleted user with a live session is just logged out
    let Some(user) = user::find_by_id(&db_pool, caller.id).await? else {
        return Err(AppError::Unauthorized);
    };

    let brand_id = directory::brand_for_user(&db_pool, caller.id).await?.map(|brand| brand.id);
    let manufacturer_id = directory::manufacturer_for_user(&db_pool, caller.id).await?.map(|m| m.id);

    Ok(ApiResponse::Ok(Me { user: user.into(), brand_id, manufacturer_id }))
}
