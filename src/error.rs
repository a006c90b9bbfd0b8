//! Error types shared by the persistence and HTTP layers
//!
//! Store operations return [`StoreError`]; handlers return [`ApiError`],
//! which renders as `{"error": "<message>"}` with the matching status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt::Display;
use thiserror::Error;
use tracing::error;

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key (email, username, natural key) is already taken
    #[error("conflict: {0}")]
    Conflict(String),

    /// Query or connection failure
    #[error("database error: {0}")]
    Database(String),

    /// A stored row could not be mapped back into a model
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StoreError::Serialization(err.to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 400: missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// 401: missing, invalid or expired bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// 401: login with unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// 404
    #[error("{0}")]
    NotFound(String),

    /// 413: body over the configured limit
    #[error("Request body too large")]
    PayloadTooLarge,

    /// 409: duplicate unique key
    #[error("{0}")]
    Conflict(String),

    /// 500: details are logged, only the public message is returned
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Log `cause` and build a 500 carrying only `message`.
    pub fn internal(message: impl Into<String>, cause: impl Display) -> Self {
        let message = message.into();
        error!(cause = %cause, "{}", message);
        ApiError::Internal(message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized | ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => ApiError::Conflict(detail),
            other => ApiError::internal("Internal server error", other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
