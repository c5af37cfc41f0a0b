// src/error.rs

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::error;
use serde_json::json;
use thiserror::Error;

/// The error surface of the task API. Each variant maps to one HTTP status
/// and every response body is the same `{"message": ...}` shape so that
/// nothing beyond the documented message leaks to the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed required input. All-or-nothing: no partial apply.
    #[error("{0}")]
    Validation(String),
    /// The entity is absent, or exists but its existence is hidden from a
    /// non-owner.
    #[error("{0}")]
    NotFound(String),
    /// The entity exists and the caller is not the owner; existence is
    /// intentionally revealed (share/recurrence family).
    #[error("{0}")]
    Forbidden(String),
    /// Duplicate collaborator.
    #[error("{0}")]
    Conflict(String),
    /// No usable identity on the request.
    #[error("Unauthorized")]
    Unauthorized,
    /// The store or the notification channel failed.
    #[error("{0}")]
    Dependency(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "message": self.to_string() }))
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(e: mongodb::error::Error) -> Self {
        error!("MongoDB error: {}", e);
        ApiError::Dependency("Database error".to_string())
    }
}
