//! Data model shared by the mailsheet crates.
//!
//! These types carry no behavior beyond simple accessors: header resolution,
//! templating and batching live in `mailsheet-core`.

pub mod mapping;
pub mod message;
pub mod options;
pub mod sheet;
pub mod symbols;

pub use mapping::ColumnMapping;
pub use message::{Attachment, BodyFormat, PreparedMessage, XLSX_MIME_TYPE};
pub use options::{FailurePolicy, SendInterval};
pub use sheet::{HeaderBand, SheetData};
pub use symbols::{DATA_SYMBOL, SymbolTable};
