use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pdf_cover::ComposeError;
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the HTTP handlers
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("File not found: {file_id}")]
    FileNotFound { file_id: String },

    #[error("File too large (max {max} bytes)")]
    FileTooLarge { max: usize },

    #[error("Unsupported file format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{0}")]
    Compose(#[from] ComposeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Error body sent to clients
#[derive(Serialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
}

impl ServiceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::FileNotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::UnsupportedFormat { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            ServiceError::Compose(
                ComposeError::EmptySelection
                | ComposeError::NoPages
                | ComposeError::NoCover
                | ComposeError::PageOutOfRange { .. }
                | ComposeError::Config(_),
            ) => StatusCode::BAD_REQUEST,
            ServiceError::Compose(ComposeError::ExportInProgress) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::FileNotFound { .. } => "file_not_found",
            ServiceError::FileTooLarge { .. } => "file_too_large",
            ServiceError::UnsupportedFormat { .. } => "unsupported_format",
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Compose(ComposeError::EmptySelection) => "empty_selection",
            ServiceError::Compose(ComposeError::NoPages) => "no_pages",
            ServiceError::Compose(ComposeError::PageOutOfRange { .. }) => "page_out_of_range",
            ServiceError::Compose(ComposeError::Pdf(_)) => "pdf_error",
            ServiceError::Compose(_) => "compose_error",
            ServiceError::Io(_) => "io_error",
            ServiceError::Config { .. } => "config_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let response = ErrorResponse {
            message: self.to_string(),
            code: self.error_code().to_string(),
        };

        (status, Json(response)).into_response()
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Compose(ComposeError::TaskJoin(err))
    }
}

/// Result type alias for handlers
pub type ServiceResult<T> = Result<T, ServiceError>;
