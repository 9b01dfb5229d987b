//! Unified error type.
//!
//! Every fallible operation in the workspace returns [`AppResult`].

use thiserror::Error;

/// Result alias used across the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required setting is missing or unparsable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A setting is present but fails validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The database session could not be opened or closed.
    #[error("database connection error: {0}")]
    DatabaseConnection(String),

    /// A statement failed on the server.
    #[error("database query error: {0}")]
    DatabaseQuery(String),

    /// The chat-completion endpoint could not be reached or rejected the call.
    #[error("external service error: {0}")]
    ExternalService(String),

    /// The chat-completion endpoint answered with an unusable body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Console I/O failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
