//! API errors and their HTTP mapping.

use thiserror::Error;

use crate::http::response::{Response, StatusCode};
use crate::model::ErrorBody;
use crate::store::StoreError;

/// Message returned when an item name is empty after trimming.
pub const INVALID_NAME_MESSAGE: &str = "name must be non-empty";

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Every failure the JSON API can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Body is not valid JSON for the expected shape
    #[error("bad_request")]
    BadRequest,

    /// Name is empty or whitespace-only
    #[error("name must be non-empty")]
    InvalidName,

    /// Unknown route or item id
    #[error("not_found")]
    NotFound,

    /// Any other failure; the detail is logged, never sent
    #[error("internal_server_error")]
    Internal(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BadRequest,
            ApiError::InvalidName => StatusCode::UnprocessableEntity,
            ApiError::NotFound => StatusCode::NotFound,
            ApiError::Internal(_) => StatusCode::InternalServerError,
        }
    }

    /// Render as `{"error": "..."}` with the mapped status.
    pub fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            tracing::error!(error = %detail, "Internal error while handling request");
        }

        Response::json(
            self.status_code(),
            &ErrorBody {
                error: self.to_string(),
            },
        )
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Internal(detail) => ApiError::Internal(detail),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> Self {
        ApiError::BadRequest
    }
}
