use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// Outcome of one upstream call, kept for diagnostics when a fetch fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamStatus {
    /// `None` when the call never produced a response (timeout, connection refused).
    pub status: Option<u16>,
    pub body: String,
}

impl UpstreamStatus {
    pub fn new(status: Option<u16>, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(code) if (200..300).contains(&code))
    }
}

impl fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{}", code),
            None => f.write_str("no response"),
        }
    }
}

/// Structured error types for the weather proxy
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    MissingParameters(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Malformed upstream data: {0}")]
    MalformedUpstreamData(String),

    #[error("Upstream error: current={current}, forecast={forecast}")]
    Gateway {
        current: UpstreamStatus,
        forecast: UpstreamStatus,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn missing_parameters(message: impl Into<String>) -> Self {
        Self::MissingParameters(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedUpstreamData(message.into())
    }

    pub fn gateway(current: UpstreamStatus, forecast: UpstreamStatus) -> Self {
        Self::Gateway { current, forecast }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::DatabaseError(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingParameters(_) | AppError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            // Upstream failures are reported to callers as "could not fetch".
            AppError::NotFound(_)
            | AppError::MalformedUpstreamData(_)
            | AppError::Gateway { .. } => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::DatabaseError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
