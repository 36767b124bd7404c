//! Error types for header resolution, rendering and dispatch.

use thiserror::Error;

/// Boxed error returned by collaborators the core does not know about.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the mail merge core.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A header band or sheet range expression could not be parsed.
    #[error("invalid range '{expression}': {reason}")]
    RangeResolution { expression: String, reason: String },

    /// Header band indices fall outside the sheet data.
    #[error("header band rows {start}..={end} out of range for {rows} rows")]
    BandOutOfRange {
        start: usize,
        end: usize,
        rows: usize,
    },

    /// The header band produced no column names.
    #[error("no header columns found in rows {start}..={end}")]
    HeaderResolution { start: usize, end: usize },

    /// A data row is shorter than a column the mapping references.
    #[error("row {row} has {width} cells but column {column} is required")]
    RowWidth {
        row: usize,
        column: usize,
        width: usize,
    },

    /// A header name given in configuration is not in the mapping.
    #[error("column '{name}' not found in headers")]
    UnknownColumn { name: String },

    /// The attachment extractor failed for a row.
    #[error("failed to extract attachment for row {row}: {source}")]
    AttachmentExtraction {
        row: usize,
        #[source]
        source: BoxError,
    },

    /// The delivery sink rejected a message.
    #[error("failed to deliver row {row} to {recipients} ({sent} sent before): {source}")]
    Delivery {
        row: usize,
        recipients: String,
        sent: usize,
        #[source]
        source: BoxError,
    },
}

impl CoreError {
    pub fn range(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RangeResolution {
            expression: expression.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
