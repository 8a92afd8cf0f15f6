// SPDX-License-Identifier: MIT

//! Error types for Curator

use thiserror::Error;

/// Result type alias for Curator operations
pub type Result<T> = std::result::Result<T, CuratorError>;

/// Curator error types
#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock error: {0}")]
    DatabaseLock(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}
