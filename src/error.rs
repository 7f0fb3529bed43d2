// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use crate::models::EventValidationError;
use crate::services::CalendarError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Google Calendar service not initialized")]
    CalendarNotInitialized,

    #[error("Google Calendar service unavailable")]
    CalendarUnavailable,

    #[error("{0}")]
    Calendar(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::CalendarNotInitialized => (
                StatusCode::FORBIDDEN,
                "calendar_not_initialized",
                self.to_string(),
            ),
            AppError::CalendarUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "calendar_unavailable",
                self.to_string(),
            ),
            AppError::Calendar(msg) => {
                tracing::warn!(error = %msg, "Calendar error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "calendar_error",
                    msg.clone(),
                )
            }
            AppError::NotConfigured(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "not_configured",
                msg.clone(),
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            success: false,
            error,
            code,
        };

        (status, Json(body)).into_response()
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::NotInitialized => AppError::CalendarNotInitialized,
            CalendarError::Unavailable => AppError::CalendarUnavailable,
            CalendarError::Provider(msg) => AppError::Calendar(msg),
        }
    }
}

impl From<EventValidationError> for AppError {
    fn from(err: EventValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

// Malformed bodies and wrong field types answer like any other bad request.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
