//! Interface to the collaborator that builds per-row workbooks.

use std::path::{Path, PathBuf};

use crate::error::BoxError;

/// Parameters for a single-row extraction.
///
/// Row numbers are 1-based sheet rows. The produced workbook keeps rows
/// `1..=header_end_row` followed by row `header_end_row + data_row_offset + 1`.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    pub source: &'a Path,
    pub sheet_name: &'a str,
    pub header_end_row: usize,
    pub data_row_offset: usize,
    /// File name (not path) the extractor should give the result.
    pub file_name: &'a str,
}

impl ExtractRequest<'_> {
    /// 1-based sheet row that is kept after the header rows.
    pub fn data_row(&self) -> usize {
        self.header_end_row + self.data_row_offset + 1
    }
}

/// Produces a workbook containing only the header rows and one data row.
pub trait AttachmentExtractor {
    /// Writes the workbook and returns its path.
    ///
    /// # Errors
    ///
    /// Any I/O or spreadsheet failure; the core wraps it per row.
    fn extract_single_row(&self, request: &ExtractRequest<'_>) -> Result<PathBuf, BoxError>;
}

/// Source workbook and extractor used to attach a row file to each message.
#[derive(Clone, Copy)]
pub struct AttachmentSource<'a> {
    pub path: &'a Path,
    pub sheet_name: &'a str,
    /// Last 1-based sheet row kept ahead of the data row.
    pub header_end_row: usize,
    pub extractor: &'a dyn AttachmentExtractor,
}

/// File name for a row attachment: recipient local part plus row sequence.
///
/// The sequence number keeps names unique within a run without relying on
/// wall-clock time.
pub fn attachment_file_name(recipient: Option<&str>, position: usize) -> String {
    let local_part = recipient
        .and_then(|address| address.split('@').next())
        .unwrap_or_default();
    let mut stem: String = local_part
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        stem.push_str("row");
    }
    format!("{stem}_{position:04}.xlsx")
}
