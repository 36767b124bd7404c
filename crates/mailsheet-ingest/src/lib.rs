//! Sheet data providers for mailsheet.
//!
//! Reads rows from local workbooks (via calamine), CSV files and shared
//! spreadsheets, and writes the single-row workbooks used as attachments.

mod cells;
mod error;
mod extract;
mod local;
mod range;
mod remote;
mod source;

// === Errors ===
pub use error::{IngestError, Result};

// === Ranges ===
pub use range::{SheetRange, column_index, column_letters};

// === Reading ===
pub use cells::{DATE_FORMAT, cell_to_string, format_number, normalize_date};
pub use local::{CellGrid, is_csv, read_cells, read_local, slice_grid};
pub use remote::GoogleSheet;
pub use source::{REMOTE_MARKER, SheetSource};

// === Extraction ===
pub use extract::XlsxRowExtractor;
