use thiserror::Error;

#[derive(Error, Debug)]
pub enum RollcallError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// A unique key was claimed by a concurrent writer.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Platform error: {0}")]
    Platform(eyre::Report),

    #[error("Database error: {0}")]
    Database(#[from] eyre::Report),

    #[error("Internal error: {0}")]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl RollcallError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RollcallError::Conflict(_))
    }

    pub fn platform(err: impl Into<eyre::Report>) -> Self {
        RollcallError::Platform(err.into())
    }
}

pub type RollcallResult<T> = Result<T, RollcallError>;
