//! HTTP API handlers for zhiyuan-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub mod admin;
pub mod analysis;
pub mod announcements;
pub mod auth;
pub mod favorites;
pub mod health;
pub mod profile;
pub mod recommend;

/// API error responses, serialized as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

impl From<zhiyuan_common::Error> for ApiError {
    fn from(err: zhiyuan_common::Error) -> Self {
        use zhiyuan_common::Error;

        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            // Storage details stay in the logs, not in responses
            Error::Database(e) => {
                tracing::error!("database error: {}", e);
                ApiError::Internal("internal error".to_string())
            }
            Error::Io(e) => {
                tracing::error!("io error: {}", e);
                ApiError::Internal("internal error".to_string())
            }
            Error::Config(msg) | Error::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                ApiError::Internal("internal error".to_string())
            }
        }
    }
}
