use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::render::RenderError;

/// Request-level errors with their HTTP mapping.
///
/// Bodies are short plain-text diagnostics: the client is a browser, and a
/// raw backtrace must never reach it.
#[derive(Debug, Error)]
pub enum AppError {
    /// Path resolution escaped the served root.
    #[error("Invalid path")]
    InvalidPath,

    #[error("{0}")]
    BadRequest(String),

    #[error("File does not exist")]
    FileNotFound,

    /// The version-control collaborator exited non-zero; carries its stderr.
    #[error("`git diff` error: {0}")]
    DiffUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidPath | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::FileNotFound => StatusCode::NOT_FOUND,
            Self::DiffUnavailable(_) | Self::Io(_) | Self::Render(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("request failed: {}", self);
        } else {
            warn!("request rejected: {}", self);
        }

        (status, self.to_string()).into_response()
    }
}
