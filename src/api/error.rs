use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::Error;
use crate::resolver::ResolveError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    /// Status relayed from the secret store
    Upstream { status: StatusCode, message: String },
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream { status, .. } => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) | ApiError::NotFound(msg) | ApiError::Internal(msg) => msg,
            ApiError::Upstream { message, .. } => message,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        (status, Json(ErrorBody { error: self.message() })).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        let message = err.public_message();
        match err.status_code() {
            404 => ApiError::NotFound(message),
            500 => ApiError::Internal(message),
            code => match StatusCode::from_u16(code) {
                Ok(status) if status.is_client_error() || status.is_server_error() => {
                    ApiError::Upstream { status, message }
                }
                // A failure must never reach the caller as a success status.
                Ok(_) => ApiError::Upstream { status: StatusCode::BAD_GATEWAY, message },
                Err(_) => ApiError::Internal(message),
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Resolve(err) => err.into(),
            Error::Config(_) | Error::Transport(_) | Error::Io(_) => {
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
