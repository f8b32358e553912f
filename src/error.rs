// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::services::tracker::TrackingError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::LocationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<TrackingError> for AppError {
    fn from(err: TrackingError) -> Self {
        let message = err.to_string();
        match err {
            TrackingError::AlreadyTracking => AppError::Conflict(message),
            TrackingError::NotTracking => AppError::NotFound(message),
            TrackingError::LocationUnavailable(msg) => AppError::LocationUnavailable(msg),
            TrackingError::InvalidParameters(_) | TrackingError::InvalidFix { .. } => {
                AppError::BadRequest(message)
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error, details) = match &self {
            AppError::NotFound(msg) => ("not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => ("bad_request", Some(msg.clone())),
            AppError::Conflict(msg) => ("conflict", Some(msg.clone())),
            AppError::LocationUnavailable(msg) => ("location_unavailable", Some(msg.clone())),
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("database_error", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
