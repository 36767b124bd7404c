//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use mailsheet_model::FailurePolicy;

#[derive(Parser)]
#[command(
    name = "mailsheet",
    version,
    about = "Send one email for every row of an Excel file or Google Sheet",
    long_about = "Send one email for every row of an Excel file, CSV file or Google Sheet.\n\n\
                  Header rows become `name: value` lines in the {data} symbol of the\n\
                  message template. Each message can carry a workbook holding the\n\
                  header rows and its own row."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values and email addresses in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Render one message per row and send them.
    Send(SendArgs),

    /// Show the columns resolved from the header rows.
    Headers(SheetArgs),
}

/// Where the rows come from and how the header is laid out.
#[derive(Args)]
pub struct SheetArgs {
    /// Google Sheets URL, Excel file or CSV file.
    #[arg(value_name = "SOURCE")]
    pub source: String,

    /// Sheet (tab) name.
    #[arg(value_name = "SHEET")]
    pub sheet_name: String,

    /// Sheet range, for example A1:F40 or A:F.
    #[arg(value_name = "RANGE")]
    pub range: String,

    /// Lines of the range holding the header, for example 1 or 1-3.
    #[arg(long = "header-lines", value_name = "N[-M]", default_value = "1")]
    pub header_lines: String,

    /// Line of the range where data starts (default: line after the header).
    #[arg(long = "rows-start", value_name = "LINE", value_parser = clap::value_parser!(u32).range(1..))]
    pub rows_start: Option<u32>,

    /// Access token for Google Sheets sources.
    #[arg(
        long = "google-token",
        env = "MAILSHEET_GOOGLE_TOKEN",
        value_name = "TOKEN",
        hide_env_values = true
    )]
    pub google_token: Option<String>,
}

#[derive(Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub sheet: SheetArgs,

    /// Header name of the column holding each row's recipients.
    #[arg(long = "mail-column", value_name = "HEADER", required_unless_present = "to")]
    pub mail_column: Option<String>,

    /// Recipient template used for every row instead of a mail column.
    #[arg(long = "to", value_name = "TEMPLATE", conflicts_with = "mail_column")]
    pub to: Option<String>,

    /// Render and show the messages without sending them.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// With --dry-run, print the messages as JSON.
    #[arg(long = "json", requires = "dry_run")]
    pub json: bool,

    /// Mail credentials and templates file.
    #[arg(
        long = "mail-credentials-path",
        value_name = "PATH",
        default_value = "mail_credentials.json"
    )]
    pub mail_credentials_path: PathBuf,

    /// Replace the recipients of every message (for test runs).
    #[arg(long = "force-to", value_name = "ADDRESS")]
    pub force_to: Option<String>,

    /// Add an address to the CC list of every message. Repeatable.
    #[arg(short = 'c', long = "add-cc", value_name = "ADDRESS")]
    pub add_cc: Vec<String>,

    /// First message (0-based, inclusive) to keep.
    #[arg(long = "send-interval-start", value_name = "N")]
    pub send_interval_start: Option<usize>,

    /// Message (0-based, exclusive) to stop at.
    #[arg(long = "send-interval-end", value_name = "N")]
    pub send_interval_end: Option<usize>,

    /// Attach a workbook with the header rows and the message's row.
    #[arg(long = "attach-row")]
    pub attach_row: bool,

    /// What to do when a row cannot be rendered.
    #[arg(long = "on-row-error", value_enum, default_value = "abort")]
    pub on_row_error: RowErrorArg,

    /// What to do when a message cannot be delivered.
    #[arg(long = "on-send-error", value_enum, default_value = "abort")]
    pub on_send_error: SendErrorArg,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RowErrorArg {
    Abort,
    Skip,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SendErrorArg {
    Abort,
    Continue,
}

impl From<RowErrorArg> for FailurePolicy {
    fn from(value: RowErrorArg) -> Self {
        match value {
            RowErrorArg::Abort => Self::FailFast,
            RowErrorArg::Skip => Self::BestEffort,
        }
    }
}

impl From<SendErrorArg> for FailurePolicy {
    fn from(value: SendErrorArg) -> Self {
        match value {
            SendErrorArg::Abort => Self::FailFast,
            SendErrorArg::Continue => Self::BestEffort,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
