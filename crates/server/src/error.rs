use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use docbridge::{ImportError, StoreError};
use serde::{Deserialize, Serialize};

pub type ServerResult<T> = Result<T, ServerError>;

/// Message returned by endpoints that do not echo the underlying failure.
pub const GENERIC_ERROR_MESSAGE: &str = "Internal Server Error";

/// Server error types
///
/// `Display` is the text sent to the caller in the `detail` field, so store
/// and import failures print their own description unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Import(#[from] ImportError),

    #[error("{0}")]
    Internal(String),
}

/// API error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ServerError {
    /// A 500 that hides the underlying failure from the caller.
    pub fn generic() -> Self {
        ServerError::Internal(GENERIC_ERROR_MESSAGE.to_string())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Store(_) | ServerError::Import(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            detail: self.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<QueryRejection> for ServerError {
    fn from(err: QueryRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

impl From<MultipartRejection> for ServerError {
    fn from(err: MultipartRejection) -> Self {
        ServerError::BadRequest(err.body_text())
    }
}

impl From<MultipartError> for ServerError {
    fn from(err: MultipartError) -> Self {
        // Body-limit overruns surface here, mid-stream
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(err.body_text())
        } else {
            ServerError::BadRequest(err.body_text())
        }
    }
}
