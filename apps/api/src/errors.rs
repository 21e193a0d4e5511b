use std::any::Any;

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::client::AnalysisError;
use crate::analysis::extract::ExtractError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// The body only ever carries the error message: `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Both resume and job description files are required")]
    MissingUpload,

    #[error("Invalid upload: {message}")]
    InvalidUpload { status: StatusCode, message: String },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error("{0}")]
    EmptyInput(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Extract(ExtractError::Aborted { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MissingUpload | AppError::Extract(_) | AppError::EmptyInput(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidUpload { status, .. } => *status,
            AppError::Analysis(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::InvalidUpload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(e: MultipartRejection) -> Self {
        AppError::InvalidUpload {
            status: e.status(),
            message: e.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed ({status}): {self:?}");
        } else {
            tracing::warn!("Request rejected ({status}): {self}");
        }

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

/// Turns a handler panic into the standard 500 error body.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unexpected internal error".to_string()
    };
    AppError::Internal(anyhow::anyhow!(message)).into_response()
}
