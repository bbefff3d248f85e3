//! Error types for the filtering proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type for the filtering proxy.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration, rejected at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Transport-level failure talking to the origin
    #[error("Upstream fetch failed: {0}")]
    Upstream(#[from] reqwest::Error),

    /// Origin answered with a non-success status
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) | AppError::UpstreamStatus(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the filtering proxy.
pub type Result<T> = std::result::Result<T, AppError>;
