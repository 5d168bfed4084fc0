use thiserror::Error;

use domain::error::DomainError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("External service error: {message}")]
    ExternalServiceError { message: String },

    #[error("Transport error: {message}")]
    TransportError { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
}

pub type AppResult<T> = Result<T, AppError>;
