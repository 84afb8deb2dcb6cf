use axum::debug_handler;
use tower_sessions::Session;

use crate::envelope::{ApiResponse, ApiResult};

#[debug_handler]
pub(crate) async fn logout(
    session: Session
) -> ApiResult<()> {
    session.flush().await?;
    Ok(ApiResponse::NoContent)
}
