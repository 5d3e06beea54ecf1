//! Error type returned by the HTTP handlers.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Messages keyed by the request field they refer to.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key for problems that concern the body as a whole.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid request body")]
    Validation(FieldErrors),

    #[error("not found")]
    NotFound,

    #[error("unsupported media type")]
    UnsupportedMediaType,

    #[error("store error: {0:#}")]
    Store(#[from] anyhow::Error),
}
impl AppError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        AppError::Validation(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => json!(errors),
            AppError::NotFound => json!({ "detail": "Not found." }),
            AppError::UnsupportedMediaType => {
                json!({ "detail": "Unsupported media type in request." })
            }
            AppError::Store(err) => {
                tracing::error!(error = ?err, "store operation failed");
                json!({ "detail": "A server error occurred." })
            }
        };
        (status, Json(body)).into_response()
    }
}
