use thiserror::Error;

/// The crate-level error type.
///
/// Storage traits and collaborator seams return this type; domain modules
/// wrap it in their own error enums via `#[from]`.
#[derive(Debug, Error)]
pub enum MoorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl MoorageError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::ServiceUnavailable(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

impl From<serde_json::Error> for MoorageError {
    fn from(err: serde_json::Error) -> Self {
        MoorageError::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MoorageError>;
