//! API error handling.
//!
//! Every failure is caught at the handler boundary and rendered as the
//! uniform envelope with `success: false`; nothing escalates above the
//! per-request handler.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::response::ApiResponse;

/// API error type.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ApiResponse::<()>::error(message));
        (status, body).into_response()
    }
}

impl From<trackboard_core::Error> for ApiError {
    fn from(err: trackboard_core::Error) -> Self {
        match err {
            trackboard_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            trackboard_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<trackboard_db::DbError> for ApiError {
    fn from(err: trackboard_db::DbError) -> Self {
        match err {
            trackboard_db::DbError::NotFound(msg) => ApiError::NotFound(msg),
            trackboard_db::DbError::Duplicate(msg) => ApiError::Conflict(msg),
            trackboard_db::DbError::InvalidData(msg) => ApiError::BadRequest(msg),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}
