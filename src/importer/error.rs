// ==========================================
// Catalog import - import error types
// ==========================================
// thiserror derive. Only two conditions are batch-fatal: an unreadable
// source and a failed snapshot load. Everything else is handled per row
// inside the commit controller and never surfaces as Err.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    // ===== source errors (batch-fatal) =====
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("unsupported source format: {0} (expected .xlsx/.xls/.csv)")]
    UnsupportedFormat(String),

    #[error("file read failed: {0}")]
    FileRead(String),

    #[error("spreadsheet parse failed: {0}")]
    SpreadsheetParse(String),

    #[error("delimited-text parse failed: {0}")]
    DelimitedParse(String),

    // ===== store errors (batch-fatal only for the snapshot load) =====
    #[error("reference snapshot load failed: {0}")]
    SnapshotLoad(String),

    #[error(transparent)]
    Store(#[from] RepositoryError),

    // ===== generic =====
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileRead(err.to_string())
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::DelimitedParse(err.to_string())
    }
}

/// Result type alias
pub type ImportResult<T> = Result<T, ImportError>;
