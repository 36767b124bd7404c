use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span};

use mailsheet_cli::logging::redact_value;
use mailsheet_cli::pipeline::{
    PrepareOptions, RecipientChoice, SheetRequest, load_sheet, prepare_batch,
};
use mailsheet_core::{BatchOptions, dispatch};
use mailsheet_ingest::SheetSource;
use mailsheet_mail::{MailCredentials, SmtpSink};
use mailsheet_model::SendInterval;

use crate::cli::{SendArgs, SheetArgs};
use crate::types::{HeadersResult, SendResult};

const PROGRESS_TEMPLATE: &str = "{spinner} [{bar:40}] {pos}/{len} {msg}";

pub fn run_headers(args: &SheetArgs) -> Result<HeadersResult> {
    let (source, request) = open_sheet(args)?;
    let loaded = load_sheet(&source, &request)?;
    Ok(HeadersResult {
        source: source.to_string(),
        sheet_name: request.sheet_name.clone(),
        range: request.range,
        data_rows: loaded.data_rows(&request).len(),
        mapping: loaded.mapping,
    })
}

pub fn run_send(args: &SendArgs) -> Result<SendResult> {
    let run_span = info_span!("send", sheet = %args.sheet.sheet_name, dry_run = args.dry_run);
    let _run_guard = run_span.enter();

    let credentials = MailCredentials::load(&args.mail_credentials_path).with_context(|| {
        format!(
            "load mail credentials from {}",
            args.mail_credentials_path.display()
        )
    })?;
    debug!(provider = %credentials.provider, relay = %credentials.smtp.host, "credentials loaded");

    let (source, request) = open_sheet(&args.sheet)?;
    let work_dir = tempfile::Builder::new()
        .prefix("mailsheet-")
        .tempdir()
        .context("create work directory")?;
    let loaded = load_sheet(&source, &request)?;

    let options = PrepareOptions {
        recipient: match (&args.mail_column, &args.to) {
            (_, Some(template)) => RecipientChoice::Template(template.clone()),
            (Some(column), None) => RecipientChoice::MailColumn(column.clone()),
            (None, None) => anyhow::bail!("either --mail-column or --to is required"),
        },
        attach_row: args.attach_row,
        batch: BatchOptions {
            force_to: args.force_to.clone(),
            cc: args.add_cc.clone(),
            interval: SendInterval::new(args.send_interval_start, args.send_interval_end),
            row_failure: args.on_row_error.into(),
        },
    };
    let batch = prepare_batch(
        &source,
        &request,
        &loaded,
        &credentials,
        &options,
        work_dir.path(),
    )?;

    let delivery = if args.dry_run {
        None
    } else {
        let mut sink = SmtpSink::from_credentials(&credentials)
            .with_context(|| format!("connect to {}", credentials.smtp.host))?;
        let deliver_span = info_span!("deliver", relay = %sink.relay());
        let _deliver_guard = deliver_span.enter();
        let start = Instant::now();

        let progress = progress_bar(batch.messages.len() as u64);
        let outcome = dispatch(
            &batch.messages,
            &mut sink,
            args.on_send_error.into(),
            |message| {
                let recipients = message.to.join(", ");
                debug!(row = message.row, to = redact_value(&recipients), "message processed");
                progress.inc(1);
            },
        );
        progress.finish_and_clear();
        let report = outcome.context("deliver messages")?;
        info!(
            sent = report.sent,
            failed = report.failed.len(),
            without_recipients = report.without_recipients.len(),
            duration_ms = start.elapsed().as_millis(),
            "delivery complete"
        );
        Some(report)
    };

    let data_rows = loaded.data_rows(&request).len();
    Ok(SendResult {
        source: source.to_string(),
        sheet_name: request.sheet_name,
        data_rows,
        messages: batch.messages,
        skipped: batch.skipped,
        delivery,
        json: args.json,
    })
}

fn open_sheet(args: &SheetArgs) -> Result<(SheetSource, SheetRequest)> {
    let source = SheetSource::from_identifier(&args.source, args.google_token.as_deref())
        .with_context(|| format!("open {}", args.source))?;
    let request = SheetRequest::parse(
        &args.sheet_name,
        &args.range,
        &args.header_lines,
        args.rows_start,
    )?;
    Ok((source, request))
}

fn progress_bar(len: u64) -> ProgressBar {
    let progress = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
        progress.set_style(style.progress_chars("=> "));
    }
    progress.set_message("sending");
    progress.enable_steady_tick(Duration::from_millis(120));
    progress
}
