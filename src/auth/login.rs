use axum::{debug_handler, extract::State};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    envelope::{ApiResponse, ApiResult},
    extract::Json,
    session::{self, SessionUser},
    AppError, AppState,
};

use super::{password, register::normalize_email, user, PublicUser};

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(LoginRequest { email, password }): Json<LoginRequest>,
) -> ApiResult<PublicUser> {
    let email = normalize_email(&email).map_err(|_| AppError::Unauthorized)?;

    let Some(user) = user::find_by_email(&db_pool, &email).await? else {
        return Err(AppError::Unauthorized);
    };

    if !password::verify(password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "rejected login");
        return Err(AppError::Unauthorized);
    }

    session::store(&session, SessionUser { id: user.id, role: user.role }).await?;
    tracing::info!(user_id = %user.id, "welcome");

    Ok(ApiResponse::Ok(user.into()))
}
