use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

use alertdeck_core::QueryError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Wire shape for failures: `{success: false, error, message}`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: String) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Query(QueryError::DecodeCursor { message }) => {
                warn!("Malformed pagination cursor: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Invalid pagination cursor", self.to_string()),
                )
            }
            ApiError::Query(QueryError::InvalidIdentifier { id }) => {
                warn!("Invalid alert ID format: {}", id);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Invalid alert ID format", self.to_string()),
                )
            }
            ApiError::Query(QueryError::NotFound { id }) => {
                warn!("Alert not found: {}", id);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Alert not found", self.to_string()),
                )
            }
            ApiError::Query(QueryError::Storage(e)) => {
                error!("Storage error serving alert request: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Failed to fetch alerts", e.to_string()),
                )
            }
            ApiError::BadRequest(message) => {
                warn!("Bad request: {}", message);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Bad request", message.clone()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
