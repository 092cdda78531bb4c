use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, errors: Vec<String> },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Locked(String),

    #[error("{0}")]
    RateLimited(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Field-level validation failure carrying every violated rule.
    pub fn validation(errors: Vec<String>) -> Self {
        ApiError::Validation {
            message: "Validation failed".to_string(),
            errors,
        }
    }

    /// Malformed request with a single top-level message and no field list.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            errors: Vec::new(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            // Uniqueness and duplicate-mapping conflicts report 400, matching
            // the behavior the frontend was built against.
            ApiError::Validation { .. } | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Locked(_) => StatusCode::LOCKED,
            ApiError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Config(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Persistence and config failures are logged in full but reported to
        // the caller as a generic message.
        let message = match &self {
            ApiError::Internal(err) => {
                error!("internal error: {err:#}");
                "Server error".to_string()
            }
            ApiError::Config(detail) => {
                error!("configuration error: {detail}");
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "success": false,
            "message": message,
        });
        if let ApiError::Validation { errors, .. } = &self {
            if !errors.is_empty() {
                body["errors"] = json!(errors);
            }
        }

        (status, Json(body)).into_response()
    }
}
