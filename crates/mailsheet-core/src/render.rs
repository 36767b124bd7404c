//! Rendering of one data row into a [`PreparedMessage`].

use std::borrow::Cow;
use std::fs;

use tracing::debug;

use mailsheet_model::{
    Attachment, BodyFormat, ColumnMapping, DATA_SYMBOL, PreparedMessage, SymbolTable,
    XLSX_MIME_TYPE,
};

use crate::attachment::{AttachmentSource, ExtractRequest, attachment_file_name};
use crate::error::{CoreError, Result};
use crate::symbols::substitute;

/// Converts a body template from a lightweight markup into the final format.
pub type BodyFormatter = fn(&str) -> String;

/// Where the recipient template of each row comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientSource {
    /// The same template for every row.
    Template(String),
    /// The cell of the row at this column.
    Column(usize),
}

impl RecipientSource {
    /// Looks up the mail column by header name.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnknownColumn`] when no header has that name.
    pub fn from_header(mapping: &ColumnMapping, name: &str) -> Result<Self> {
        mapping
            .column_of(name)
            .map(Self::Column)
            .ok_or_else(|| CoreError::UnknownColumn {
                name: name.to_string(),
            })
    }

    fn template<'a>(&'a self, position: usize, row: &'a [String]) -> Result<&'a str> {
        match self {
            Self::Template(template) => Ok(template.as_str()),
            Self::Column(column) => {
                row.get(*column)
                    .map(String::as_str)
                    .ok_or(CoreError::RowWidth {
                        row: position,
                        column: *column,
                        width: row.len(),
                    })
            }
        }
    }
}

/// Subject, body, sender and recipient templates for a run.
#[derive(Debug, Clone)]
pub struct MessageTemplates {
    pub subject: String,
    pub body: String,
    pub sender: String,
    pub recipient: RecipientSource,
    pub format: BodyFormat,
    /// Applied to the body template before substitution.
    pub formatter: Option<BodyFormatter>,
}

impl MessageTemplates {
    fn body_template(&self) -> Cow<'_, str> {
        match self.formatter {
            Some(format) => Cow::Owned(format(&self.body)),
            None => Cow::Borrowed(&self.body),
        }
    }
}

/// Escapes `&`, `<`, `>` and quotes for HTML text.
pub fn escape_html(text: &str) -> String {
    let mut html = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '"' => html.push_str("&quot;"),
            '\'' => html.push_str("&#39;"),
            _ => html.push(ch),
        }
    }
    html
}

fn cell_text(format: BodyFormat, text: &str) -> Cow<'_, str> {
    match format {
        BodyFormat::Html => Cow::Owned(escape_html(text)),
        BodyFormat::Plain => Cow::Borrowed(text),
    }
}

/// Builds the `{data}` value: one `header: value` line per mapped column.
///
/// Each line ends with the format's line break. For HTML bodies header names
/// and cell values are escaped, the template around them is not.
///
/// # Errors
///
/// Returns [`CoreError::RowWidth`] when `row` has no cell for a mapped column.
pub fn data_block(
    mapping: &ColumnMapping,
    position: usize,
    row: &[String],
    format: BodyFormat,
) -> Result<String> {
    let mut block = String::new();
    for (column, name) in mapping.iter() {
        let value = row.get(column).ok_or(CoreError::RowWidth {
            row: position,
            column,
            width: row.len(),
        })?;
        block.push_str(&cell_text(format, name));
        block.push_str(": ");
        block.push_str(&cell_text(format, value));
        block.push_str(format.line_break());
    }
    Ok(block)
}

/// Splits a `;`-separated recipient list, trimming and dropping blanks.
pub fn split_recipients(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|address| !address.is_empty())
        .map(str::to_string)
        .collect()
}

/// Renders the data row at `position` into a message.
///
/// `symbols` is copied and the copy receives the row's `{data}` entry, so the
/// caller's table is never modified.
///
/// # Errors
///
/// Returns [`CoreError::RowWidth`] for short rows and
/// [`CoreError::AttachmentExtraction`] when the attachment cannot be built.
pub fn render_row(
    mapping: &ColumnMapping,
    position: usize,
    row: &[String],
    templates: &MessageTemplates,
    symbols: &SymbolTable,
    attachment: Option<&AttachmentSource<'_>>,
) -> Result<PreparedMessage> {
    let data = data_block(mapping, position, row, templates.format)?;
    let recipient_template = templates.recipient.template(position, row)?;

    let mut row_symbols = symbols.clone();
    row_symbols.insert(DATA_SYMBOL, data);

    let subject = substitute(&templates.subject, &row_symbols);
    let sender = substitute(&templates.sender, &row_symbols);
    let body = substitute(&templates.body_template(), &row_symbols);
    let to = split_recipients(&substitute(recipient_template, &row_symbols));

    let attachment = attachment
        .map(|source| extract_attachment(source, position, to.first().map(String::as_str)))
        .transpose()?;

    debug!(
        row = position,
        recipients = to.len(),
        attachment = attachment.is_some(),
        "rendered row"
    );
    Ok(PreparedMessage {
        row: position,
        subject,
        body,
        format: templates.format,
        sender,
        to,
        cc: Vec::new(),
        attachment,
    })
}

fn extract_attachment(
    source: &AttachmentSource<'_>,
    position: usize,
    recipient: Option<&str>,
) -> Result<Attachment> {
    let file_name = attachment_file_name(recipient, position);
    let request = ExtractRequest {
        source: source.path,
        sheet_name: source.sheet_name,
        header_end_row: source.header_end_row,
        data_row_offset: position,
        file_name: &file_name,
    };
    let path = source
        .extractor
        .extract_single_row(&request)
        .map_err(|err| CoreError::AttachmentExtraction {
            row: position,
            source: err,
        })?;
    let content = fs::read(&path).map_err(|err| CoreError::AttachmentExtraction {
        row: position,
        source: Box::new(err),
    })?;
    Ok(Attachment {
        file_name,
        content,
        mime_type: XLSX_MIME_TYPE.to_string(),
    })
}
