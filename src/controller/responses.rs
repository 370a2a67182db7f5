use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize, Clone, Debug)]
pub struct DataResponse<T> {
    pub status: &'static str,
    pub data: T,
    pub message: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure body of the places routes.
#[derive(Serialize, Clone, Debug)]
pub struct ProxyErrorResponse {
    pub success: bool,
    pub error: String,
}

pub fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}
