// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No credentials found for user {0}")]
    CredentialsNotFound(String),

    #[error("Strava token refresh failed (HTTP {status}): {body}")]
    TokenRefreshFailed { status: u16, body: String },

    #[error("Failed to persist refreshed credentials: {0}")]
    CredentialPersistFailed(String),

    #[error("Strava API error: {message}")]
    UpstreamFetchFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Notion write failed: {message}")]
    DownstreamWriteFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Notion query failed: {message}")]
    DownstreamReadFailed {
        status: Option<u16>,
        message: String,
    },

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status reported by the upstream service, if the error came from one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            AppError::TokenRefreshFailed { status, .. } => Some(*status),
            AppError::UpstreamFetchFailed { status, .. }
            | AppError::DownstreamWriteFailed { status, .. }
            | AppError::DownstreamReadFailed { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match &self {
            AppError::InvalidArgument(msg) | AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Invalid request.", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized.", None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden.", None),
            AppError::CredentialsNotFound(_) => {
                (StatusCode::NOT_FOUND, "Credentials not found.", Some(self.to_string()))
            }
            AppError::TokenRefreshFailed { .. } | AppError::UpstreamFetchFailed { .. } => {
                (StatusCode::BAD_GATEWAY, "Strava API error.", Some(self.to_string()))
            }
            AppError::DownstreamWriteFailed { .. } | AppError::DownstreamReadFailed { .. } => {
                (StatusCode::BAD_GATEWAY, "Notion API error.", Some(self.to_string()))
            }
            AppError::CredentialPersistFailed(msg) | AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error.", None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.", None)
            }
        };

        let body = ErrorResponse {
            message: message.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
