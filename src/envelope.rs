use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;

use crate::AppError;

#[derive(Serialize)]
struct DataBody<T> {
    data: T,
}

pub enum ApiResponse<T> {
    Ok(T),
    Created(T),
    NoContent,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            ApiResponse::Ok(data) => (StatusCode::OK, Json(DataBody { data })).into_response(),
            ApiResponse::Created(data) => (StatusCode::CREATED, Json(DataBody { data })).into_response(),
            ApiResponse::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;
