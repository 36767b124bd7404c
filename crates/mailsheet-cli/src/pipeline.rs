//! Run stages shared by the `send` and `headers` commands.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use mailsheet_core::{
    AttachmentSource, Batch, BatchOptions, MessageTemplates, RecipientSource, build_batch,
    parse_header_band, resolve_headers,
};
use mailsheet_ingest::{SheetRange, SheetSource, XlsxRowExtractor};
use mailsheet_mail::MailCredentials;
use mailsheet_model::{ColumnMapping, HeaderBand, SheetData};

/// Subdirectory of the work directory receiving extracted row workbooks.
const ATTACHMENT_DIR: &str = "attachments";

/// Which part of the range holds the header and where data begins.
#[derive(Debug, Clone)]
pub struct SheetRequest {
    pub sheet_name: String,
    pub range: SheetRange,
    pub band: HeaderBand,
    /// 0-based index of the first data row within the range.
    pub data_start: usize,
}

impl SheetRequest {
    /// Builds a request from command-line text.
    ///
    /// `rows_start` is the 1-based line of the range where data begins and
    /// defaults to the line after the header band.
    pub fn parse(
        sheet_name: &str,
        range: &str,
        header_lines: &str,
        rows_start: Option<u32>,
    ) -> Result<Self> {
        let range = SheetRange::parse(range)?;
        let band = parse_header_band(header_lines)?;
        let data_start = match rows_start {
            Some(line) => line.saturating_sub(1) as usize,
            None => band.next_row(),
        };
        Ok(Self {
            sheet_name: sheet_name.to_string(),
            range,
            band,
            data_start,
        })
    }

    /// Number of sheet rows, from the top of the sheet, that precede the data.
    pub fn header_end_row(&self) -> usize {
        self.range.first_row() as usize + self.data_start
    }
}

/// Sheet values plus the column mapping resolved from them.
#[derive(Debug)]
pub struct LoadedSheet {
    pub data: SheetData,
    pub mapping: ColumnMapping,
}

impl LoadedSheet {
    pub fn data_rows(&self, request: &SheetRequest) -> &[Vec<String>] {
        self.data.rows_from(request.data_start)
    }
}

/// Reads the range and resolves its header band.
pub fn load_sheet(source: &SheetSource, request: &SheetRequest) -> Result<LoadedSheet> {
    let span = info_span!("read", source = %source, sheet = %request.sheet_name);
    let _guard = span.enter();
    let start = Instant::now();

    let data = source
        .read(&request.sheet_name, request.range)
        .with_context(|| format!("read {}!{} from {source}", request.sheet_name, request.range))?;
    let mapping = resolve_headers(&data, request.band).context("resolve header columns")?;
    info!(
        rows = data.len(),
        columns = mapping.len(),
        duration_ms = start.elapsed().as_millis(),
        "sheet loaded"
    );
    Ok(LoadedSheet { data, mapping })
}

/// Where each message's recipients come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientChoice {
    /// Header name of the column holding the recipient template.
    MailColumn(String),
    /// One template for every row.
    Template(String),
}

impl RecipientChoice {
    fn resolve(&self, mapping: &ColumnMapping) -> Result<RecipientSource> {
        match self {
            Self::MailColumn(name) => {
                let known: Vec<&str> = mapping.names().collect();
                RecipientSource::from_header(mapping, name)
                    .with_context(|| format!("available columns: {}", known.join(", ")))
            }
            Self::Template(template) => Ok(RecipientSource::Template(template.clone())),
        }
    }
}

/// Builds the run's templates from the credentials file.
///
/// HTML templates are sent as written; `text` templates go through
/// [`text_to_html`](mailsheet_mail::text_to_html) first.
pub fn message_templates(
    credentials: &MailCredentials,
    recipient: RecipientSource,
) -> MessageTemplates {
    MessageTemplates {
        subject: credentials.subject.clone(),
        body: credentials.message.clone(),
        sender: credentials.sender.clone(),
        recipient,
        format: credentials.markup.body_format(),
        formatter: credentials.markup.formatter(),
    }
}

/// Everything besides the sheet that shapes the batch.
#[derive(Debug, Clone)]
pub struct PrepareOptions {
    pub recipient: RecipientChoice,
    pub attach_row: bool,
    pub batch: BatchOptions,
}

/// Renders every data row and applies the run-wide overrides.
///
/// Downloaded workbooks and extracted attachments are written under
/// `work_dir`.
pub fn prepare_batch(
    source: &SheetSource,
    request: &SheetRequest,
    loaded: &LoadedSheet,
    credentials: &MailCredentials,
    options: &PrepareOptions,
    work_dir: &Path,
) -> Result<Batch> {
    let span = info_span!("render", sheet = %request.sheet_name);
    let _guard = span.enter();
    let start = Instant::now();

    let recipient = options.recipient.resolve(&loaded.mapping)?;
    let templates = message_templates(credentials, recipient);
    let rows = loaded.data_rows(request);

    let rendered = if options.attach_row {
        let workbook = source
            .local_workbook(work_dir)
            .context("fetch workbook for attachments")?;
        let output_dir = work_dir.join(ATTACHMENT_DIR);
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("create {}", output_dir.display()))?;
        let extractor = XlsxRowExtractor::new(output_dir);
        let attachment = AttachmentSource {
            path: &workbook,
            sheet_name: &request.sheet_name,
            header_end_row: request.header_end_row(),
            extractor: &extractor,
        };
        build_batch(
            rows,
            &loaded.mapping,
            &templates,
            &credentials.symbols,
            Some(&attachment),
            &options.batch,
        )
    } else {
        build_batch(
            rows,
            &loaded.mapping,
            &templates,
            &credentials.symbols,
            None,
            &options.batch,
        )
    };
    let batch = rendered.context("render messages")?;

    info!(
        rows = rows.len(),
        messages = batch.len(),
        skipped = batch.skipped.len(),
        duration_ms = start.elapsed().as_millis(),
        "batch ready"
    );
    Ok(batch)
}
