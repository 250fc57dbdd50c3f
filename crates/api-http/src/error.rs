//! HTTP Error Types
//!
//! Maps application errors onto status codes and a JSON error body.

use atelier_core::domain::DomainError;
use atelier_core::error::AppError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing multipart field: {0}")]
    MissingField(&'static str),

    #[error("Malformed multipart payload: {0}")]
    Multipart(String),

    #[error(transparent)]
    App(#[from] AppError),
}

/// JSON body attached to every error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::MissingField(_) => (StatusCode::UNPROCESSABLE_ENTITY, "missing_field"),
            ApiError::Multipart(_) => (StatusCode::BAD_REQUEST, "bad_multipart"),
            // A client upload we could not decode is the client's problem;
            // everything else from the application is ours.
            ApiError::App(AppError::Domain(DomainError::Decode(_))) => {
                (StatusCode::BAD_REQUEST, "undecodable_image")
            }
            ApiError::App(AppError::Pipeline(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "generation_failed")
            }
            ApiError::App(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(code = code, error = %self, "Request failed");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}
