use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::api::auth::Role;
use crate::logic::UpdateRejection;

/// JSON error envelope; every failure answers `{"message": ...}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Error taxonomy for the HTTP surface. Validation and lookup failures
/// are caller problems (4xx); storage failures are ours (500) and are
/// logged before the response leaves.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidUpdate(#[from] UpdateRejection),

    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("Missing required role: {0}")]
    Forbidden(Role),

    #[error("{0}")]
    Storage(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidUpdate(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Storage(e) = &self {
            log::error!("storage failure: {:#}", e);
        }
        (self.status(), Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}
