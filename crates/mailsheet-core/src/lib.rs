//! Header mapping and row-to-message templating for spreadsheet mail merges.
//!
//! The pipeline is:
//!
//! 1. [`resolve_headers`] turns a band of raw rows into a [`ColumnMapping`].
//! 2. [`build_batch`] renders every data row with [`render_row`], which builds
//!    the `{data}` block, substitutes templates with [`substitute`] and
//!    optionally asks an [`AttachmentExtractor`] for a single-row workbook.
//! 3. [`dispatch`] hands the prepared messages to a [`DeliverySink`].
//!
//! Sheet I/O, SMTP and configuration loading live in sibling crates and meet
//! the core only through these traits.
//!
//! [`ColumnMapping`]: mailsheet_model::ColumnMapping

mod attachment;
mod band;
mod batch;
mod delivery;
mod error;
mod header;
mod render;
mod symbols;

// === Error Types ===
pub use error::{BoxError, CoreError, Result};

// === Header Resolution ===
pub use band::parse_header_band;
pub use header::{ExactWidth, HeaderStrategy, resolve_headers};

// === Templating ===
pub use render::{
    BodyFormatter, MessageTemplates, RecipientSource, data_block, escape_html, render_row,
    split_recipients,
};
pub use symbols::substitute;

// === Attachments ===
pub use attachment::{AttachmentExtractor, AttachmentSource, ExtractRequest, attachment_file_name};

// === Batching and Delivery ===
pub use batch::{Batch, BatchOptions, SkippedRow, build_batch, post_process};
pub use delivery::{DeliveryReport, DeliverySink, FailedDelivery, dispatch};
