//! Maps `DomainError` onto HTTP responses with a `{error}` JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domains::DomainError;
use serde_json::json;
use tracing::error;

use crate::messages::user_message;

#[derive(Debug)]
pub struct ApiError {
    pub error: DomainError,
    message: Option<&'static str>,
}

impl ApiError {
    /// Replaces the default user message for this error.
    pub fn with_message(error: DomainError, message: &'static str) -> Self {
        Self {
            error,
            message: Some(message),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self {
            error,
            message: None,
        }
    }
}

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::InvalidDate
        | DomainError::EmptyContent
        | DomainError::ContentTooLong { .. }
        | DomainError::MalformedBody => StatusCode::BAD_REQUEST,
        DomainError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::StoreUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.error);
        if status.is_server_error() {
            error!(error = %self.error, "request failed");
        }

        let message = match self.message {
            Some(message) => message.to_string(),
            None => user_message(&self.error),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
