//! API error handling.
//!
//! # Invariants
//! - Every error body carries an `error` string.
//! - Validation bodies also carry the full field → message map as `errors`.
//! - Storage detail is logged, never returned to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use roster_core::{FieldErrors, UserServiceError};
use serde::Serialize;
use thiserror::Error;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already registered";
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method not allowed";
pub const SERVER_ERROR_MESSAGE: &str = "Server error";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("email already registered")]
    DuplicateEmail,
    #[error("user not found")]
    UserNotFound,
    #[error("route not found")]
    RouteNotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("internal failure: {0}")]
    Internal(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MalformedBody(_) | Self::Validation(_) | Self::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            Self::UserNotFound | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_body(self) -> ErrorBody {
        match self {
            Self::MalformedBody(_) => ErrorBody {
                error: INVALID_BODY_MESSAGE.to_string(),
                errors: None,
            },
            Self::Validation(errors) => ErrorBody {
                error: errors.first_message().unwrap_or_default().to_string(),
                errors: Some(errors),
            },
            Self::DuplicateEmail => ErrorBody {
                error: DUPLICATE_EMAIL_MESSAGE.to_string(),
                errors: None,
            },
            Self::UserNotFound => ErrorBody {
                error: USER_NOT_FOUND_MESSAGE.to_string(),
                errors: None,
            },
            Self::RouteNotFound => ErrorBody {
                error: "Not found".to_string(),
                errors: None,
            },
            Self::MethodNotAllowed => ErrorBody {
                error: METHOD_NOT_ALLOWED_MESSAGE.to_string(),
                errors: None,
            },
            Self::Internal(_) => ErrorBody {
                error: SERVER_ERROR_MESSAGE.to_string(),
                errors: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Internal(detail) = &self {
            error!("event=request_failed module=api status=error error={detail}");
        }
        (status, Json(self.into_body())).into_response()
    }
}

impl From<UserServiceError> for ApiError {
    fn from(value: UserServiceError) -> Self {
        match value {
            UserServiceError::Validation(errors) => Self::Validation(errors),
            UserServiceError::DuplicateEmail => Self::DuplicateEmail,
            UserServiceError::NotFound(_) => Self::UserNotFound,
            UserServiceError::Repo(err) => Self::Internal(err.to_string()),
        }
    }
}
