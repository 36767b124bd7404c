//! Batch orchestration: render every row, then apply run-wide overrides.

use tracing::{info, warn};

use mailsheet_model::{ColumnMapping, FailurePolicy, PreparedMessage, SendInterval, SymbolTable};

use crate::attachment::AttachmentSource;
use crate::error::{CoreError, Result};
use crate::render::{MessageTemplates, render_row};

/// Run-wide settings applied after rendering.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Replaces every message's recipients with this single address.
    pub force_to: Option<String>,
    /// Appended to every message's CC list.
    pub cc: Vec<String>,
    /// Positions of the rendered batch that are kept.
    pub interval: SendInterval,
    /// Whether a failing row aborts the run or is skipped.
    pub row_failure: FailurePolicy,
}

/// A row that failed to render under [`FailurePolicy::BestEffort`].
#[derive(Debug)]
pub struct SkippedRow {
    pub row: usize,
    pub error: CoreError,
}

/// Rendered messages plus the rows that were skipped.
#[derive(Debug, Default)]
pub struct Batch {
    pub messages: Vec<PreparedMessage>,
    pub skipped: Vec<SkippedRow>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Renders `rows` in order and post-processes the result.
///
/// Row positions passed to the renderer are indices into `rows`, which is
/// also the offset used for attachment extraction.
///
/// # Errors
///
/// Under [`FailurePolicy::FailFast`], the first row error is returned.
pub fn build_batch(
    rows: &[Vec<String>],
    mapping: &ColumnMapping,
    templates: &MessageTemplates,
    symbols: &SymbolTable,
    attachment: Option<&AttachmentSource<'_>>,
    options: &BatchOptions,
) -> Result<Batch> {
    let mut batch = Batch::default();
    for (position, row) in rows.iter().enumerate() {
        match render_row(mapping, position, row, templates, symbols, attachment) {
            Ok(message) => batch.messages.push(message),
            Err(error) => match options.row_failure {
                FailurePolicy::FailFast => return Err(error),
                FailurePolicy::BestEffort => {
                    warn!(row = position, %error, "skipping row");
                    batch.skipped.push(SkippedRow {
                        row: position,
                        error,
                    });
                }
            },
        }
    }
    let rendered = batch.messages.len();
    batch.messages = post_process(batch.messages, options);
    info!(
        rows = rows.len(),
        rendered,
        skipped = batch.skipped.len(),
        selected = batch.messages.len(),
        "batch built"
    );
    Ok(batch)
}

/// Applies, in order, the forced recipient, the extra CC addresses and the
/// send interval.
pub fn post_process(messages: Vec<PreparedMessage>, options: &BatchOptions) -> Vec<PreparedMessage> {
    messages
        .into_iter()
        .map(|mut message| {
            if let Some(address) = &options.force_to {
                message.to = vec![address.clone()];
            }
            message.cc.extend(options.cc.iter().cloned());
            message
        })
        .enumerate()
        .filter(|(position, _)| options.interval.contains(*position))
        .map(|(_, message)| message)
        .collect()
}
