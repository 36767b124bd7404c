//! Error types for sheet reading and attachment extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading sheets or writing row workbooks.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Range Errors ===
    /// Sheet range expression is not `A1:B2` or `A:B`.
    #[error("invalid sheet range '{expression}': {reason}")]
    InvalidRange { expression: String, reason: String },

    // === Local File Errors ===
    /// Spreadsheet file not found.
    #[error("spreadsheet not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to open or parse a workbook.
    #[error("failed to read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    /// Failed to parse a CSV file.
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Requested sheet does not exist in the workbook.
    #[error("sheet '{sheet}' not found in {path}")]
    SheetNotFound { sheet: String, path: PathBuf },

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Remote Errors ===
    /// URL does not look like a shared spreadsheet link.
    #[error("invalid spreadsheet URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Remote source used without an access token.
    #[error("an access token is required to read {url}")]
    MissingAccessToken { url: String },

    /// HTTP request failed.
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Remote API answered with a non-success status.
    #[error("{url} returned {status}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    // === Extraction Errors ===
    /// Requested row is not in the sheet.
    #[error("row {row} is past the last row ({last}) of sheet '{sheet}'")]
    RowOutOfRange {
        row: usize,
        last: usize,
        sheet: String,
    },

    /// Failed to build the output workbook.
    #[error("failed to build workbook {path}: {source}")]
    XlsxWrite {
        path: PathBuf,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

impl IngestError {
    pub(crate) fn range(expression: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRange {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
