use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Auth error: {0}")]
    Auth(String),

    /// Store-side failure (missing document, rejected batch, backend fault).
    /// Causes are collapsed; callers only branch on success or failure.
    #[error("Store error: {0}")]
    Store(String),

    #[error("Export failed")]
    Export(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
