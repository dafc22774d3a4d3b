use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("This email has already been used")]
    DuplicateEmail,

    #[error("Invalid application payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl AppError {
    /// Only the duplicate rejection gets its own status; everything else is a generic failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail => StatusCode::BAD_REQUEST,
            AppError::Config(_) | AppError::InvalidPayload(_) | AppError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
