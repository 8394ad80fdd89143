use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the service, at startup or at a handler boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// The request body or path could not be decoded.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No live row has this id.
    #[error("Todo with ID {0} not found")]
    NotFound(i64),

    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Config(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let status = self.status();
        match &self {
            AppError::BadRequest(msg) => warn!(error = %msg, "Rejected request"),
            AppError::NotFound(_) => {}
            other => error!(error = %other, "Request failed"),
        }

        let (error, details) = match self {
            AppError::BadRequest(msg) => ("Bad request".to_string(), Some(msg)),
            AppError::NotFound(id) => (format!("Todo with ID {id} not found"), None),
            // Logged above; the client only learns the category.
            AppError::Store(_) => ("Store error".to_string(), None),
            AppError::Config(_) => ("Configuration error".to_string(), None),
            AppError::Io(_) => ("Internal server error".to_string(), None),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
