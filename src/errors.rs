use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    /// Missing or unusable process configuration. Fatal at startup.
    Config(String),
    /// Caller supplied a malformed request. Rejected before any side effect.
    Validation(String),
    /// An image or text provider failed or answered with a non-success status.
    Upstream(String),
    /// A single-shot completion did not satisfy the slide content schema.
    InvalidContent(String),
    /// Object storage rejected a bucket or upload operation.
    Storage(String),
    /// The event stream did not follow the progress protocol.
    Protocol(String),
    /// A generation run ended with an `error` event.
    RunFailed(String),
    /// The consumer of a generation run went away.
    Disconnected,
    Db(sqlx::Error),
    Http(reqwest::Error),
    Json(serde_json::Error),
    NotFound,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(e) => write!(f, "Configuration error: {e}"),
            AppError::Validation(e) => write!(f, "{e}"),
            AppError::Upstream(e) => write!(f, "Upstream error: {e}"),
            AppError::InvalidContent(e) => write!(f, "Invalid generated content: {e}"),
            AppError::Storage(e) => write!(f, "Storage error: {e}"),
            AppError::Protocol(e) => write!(f, "Protocol error: {e}"),
            AppError::RunFailed(e) => write!(f, "Generation failed: {e}"),
            AppError::Disconnected => write!(f, "Client disconnected"),
            AppError::Db(e) => write!(f, "Database error: {e}"),
            AppError::Http(e) => write!(f, "HTTP error: {e}"),
            AppError::Json(e) => write!(f, "JSON error: {e}"),
            AppError::NotFound => write!(f, "Not found"),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Upstream(_) | AppError::InvalidContent(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{self}");
        }
        HttpResponse::build(status).json(serde_json::json!({ "error": self.to_string() }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Http(e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Json(e)
    }
}
