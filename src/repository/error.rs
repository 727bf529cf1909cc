// ==========================================
// Catalog import - repository error types
// ==========================================
// thiserror derive; unique-key conflicts are discriminated so the caller
// can report duplicate SKUs distinctly.
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("database query failed: {0}")]
    Query(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("entity not found: {0}")]
    NotFound(String),

    #[error("SKU generation failed: {0}")]
    SkuGeneration(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string());
                if detail.contains("UNIQUE") {
                    RepositoryError::UniqueViolation(detail)
                } else {
                    RepositoryError::Query(detail)
                }
            }
            _ => RepositoryError::Query(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Query(format!("payload serialization failed: {}", err))
    }
}

/// Result type alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;
