use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tether_core::{CoreError, ShortenerError};
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Shortener(#[from] ShortenerError),
    #[error("failed to read request body: {0}")]
    BodyRead(#[from] BytesRejection),
    #[error("malformed request body: {0}")]
    InvalidBody(String),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("no route for this path")]
    RouteNotFound,
}

impl From<CoreError> for AppError {
    fn from(value: CoreError) -> Self {
        Self::Shortener(value.into())
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Shortener(err) => match err {
                ShortenerError::MissingUrl => (StatusCode::BAD_REQUEST, "missing_url"),
                ShortenerError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "invalid_url"),
                ShortenerError::MissingShortCode => (StatusCode::BAD_REQUEST, "missing_code"),
                ShortenerError::InvalidShortCode(_) => (StatusCode::BAD_REQUEST, "invalid_code"),
                ShortenerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                ShortenerError::GenerationExhausted { .. }
                | ShortenerError::Generator(_)
                | ShortenerError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            },
            AppError::BodyRead(rejection) => (rejection.status(), "invalid_body"),
            AppError::InvalidBody(_) => (StatusCode::BAD_REQUEST, "invalid_body"),
            AppError::UnknownField(_) => (StatusCode::BAD_REQUEST, "unknown_field"),
            AppError::RouteNotFound => (StatusCode::NOT_FOUND, "route_not_found"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
