//! Mail credentials file.
//!
//! A JSON object with the account, the message templates and optional
//! stable symbols:
//!
//! ```json
//! {
//!   "provider": "gmail",
//!   "username": "office@example.com",
//!   "app_password": "abcd efgh ijkl mnop",
//!   "subject": "Grades for {course}",
//!   "message": "<p>Hello,</p>{data}",
//!   "symbols": { "{course}": "Algebra" }
//! }
//! ```
//!
//! `body_format` is `html` (the default, template sent as written), `plain`
//! or `text` (plain text converted to HTML).

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use mailsheet_model::SymbolTable;

use crate::error::{MailError, Result};
use crate::markup::TemplateMarkup;
use crate::provider::{DEFAULT_PORT, Provider, SmtpSettings, TlsMode};

/// File layout before validation; every field is optional so missing ones
/// can be reported by name.
#[derive(Debug, Default, Deserialize)]
struct RawCredentials {
    provider: Option<String>,
    username: Option<String>,
    app_password: Option<String>,
    message: Option<String>,
    subject: Option<String>,
    sender: Option<String>,
    #[serde(default)]
    symbols: SymbolTable,
    body_format: Option<TemplateMarkup>,
    host: Option<String>,
    port: Option<u16>,
    tls: Option<TlsMode>,
}

#[derive(Clone)]
pub struct MailCredentials {
    pub provider: Provider,
    pub smtp: SmtpSettings,
    pub username: String,
    pub app_password: String,
    /// Body template.
    pub message: String,
    pub subject: String,
    /// Sender template, defaults to the username.
    pub sender: String,
    pub symbols: SymbolTable,
    pub markup: TemplateMarkup,
}

impl fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailCredentials")
            .field("provider", &self.provider)
            .field("smtp", &self.smtp)
            .field("username", &self.username)
            .field("app_password", &"[REDACTED]")
            .field("subject", &self.subject)
            .field("sender", &self.sender)
            .field("symbols", &self.symbols.len())
            .field("markup", &self.markup)
            .finish_non_exhaustive()
    }
}

impl MailCredentials {
    /// Reads and validates a credentials file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| MailError::ReadCredentials {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parses and validates credentials JSON.
    ///
    /// # Errors
    ///
    /// [`MailError::MissingField`] names the first required field that is
    /// absent or blank.
    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawCredentials = serde_json::from_str(text)
            .map_err(|err| MailError::InvalidCredentials(err.to_string()))?;

        let provider: Provider = required(raw.provider, "provider")?.parse()?;
        let username = required(raw.username, "username")?;
        let app_password = required(raw.app_password, "app_password")?;
        let message = required(raw.message, "message")?;

        let smtp = match provider.preset() {
            Some(mut preset) => {
                if let Some(port) = raw.port {
                    preset.port = port;
                }
                if let Some(tls) = raw.tls {
                    preset.tls = tls;
                }
                preset
            }
            None => SmtpSettings {
                host: required(raw.host, "host")?,
                port: raw.port.unwrap_or(DEFAULT_PORT),
                tls: raw.tls.unwrap_or_default(),
            },
        };

        Ok(Self {
            provider,
            smtp,
            sender: raw.sender.unwrap_or_else(|| username.clone()),
            username,
            app_password,
            message,
            subject: raw.subject.unwrap_or_default(),
            symbols: raw.symbols,
            markup: raw.body_format.unwrap_or_default(),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(MailError::MissingField(field))
}
