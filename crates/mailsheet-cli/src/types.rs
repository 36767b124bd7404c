use mailsheet_core::{DeliveryReport, SkippedRow};
use mailsheet_ingest::SheetRange;
use mailsheet_model::{ColumnMapping, PreparedMessage};

#[derive(Debug)]
pub struct SendResult {
    pub source: String,
    pub sheet_name: String,
    pub data_rows: usize,
    pub messages: Vec<PreparedMessage>,
    pub skipped: Vec<SkippedRow>,
    /// `None` for dry runs.
    pub delivery: Option<DeliveryReport>,
    pub json: bool,
}

impl SendResult {
    /// Skipped rows and rejected messages make the run fail.
    pub fn has_errors(&self) -> bool {
        !self.skipped.is_empty()
            || self
                .delivery
                .as_ref()
                .is_some_and(|report| !report.failed.is_empty())
    }
}

#[derive(Debug)]
pub struct HeadersResult {
    pub source: String,
    pub sheet_name: String,
    pub range: SheetRange,
    pub mapping: ColumnMapping,
    pub data_rows: usize,
}
