//! Shared spreadsheets read through the Google Sheets API.

use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, USER_AGENT};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use mailsheet_model::SheetData;

use crate::cells::{bool_text, normalize_date};
use crate::error::{IngestError, Result};
use crate::range::SheetRange;

/// Sheets v4 API base URL.
const SHEETS_API_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Spreadsheet export base URL.
const EXPORT_URL: &str = "https://docs.google.com/spreadsheets/d";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Body of a `values.get` response.
#[derive(Debug, Default, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// A spreadsheet shared by URL.
pub struct GoogleSheet {
    url: String,
    spreadsheet_id: String,
    access_token: String,
    client: Client,
}

impl std::fmt::Debug for GoogleSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheet")
            .field("url", &self.url)
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

impl GoogleSheet {
    /// Opens a spreadsheet URL of the form `.../spreadsheets/d/<ID>/edit`.
    ///
    /// # Errors
    ///
    /// Fails when the URL has no spreadsheet id, the token is missing or the
    /// HTTP client cannot be built.
    pub fn from_url(url: &str, access_token: Option<&str>) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id(url)?;
        let access_token = access_token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| IngestError::MissingAccessToken {
                url: url.to_string(),
            })?
            .to_string();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| IngestError::Http {
                url: url.to_string(),
                source,
            })?;
        Ok(Self {
            url: url.to_string(),
            spreadsheet_id,
            access_token,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Fetches the formatted values of `sheet_name!range`.
    ///
    /// Rows come back as the API returns them, without trailing empty cells,
    /// so they may be narrower than the range.
    pub fn read_values(&self, sheet_name: &str, range: SheetRange) -> Result<SheetData> {
        let url = self.values_url(sheet_name, range)?;
        debug!(spreadsheet = %self.spreadsheet_id, sheet = sheet_name, range = %range, "fetching values");
        let response = self.get(url.as_str(), "application/json")?;
        let body: ValueRange = response.json().map_err(|source| IngestError::Http {
            url: url.to_string(),
            source,
        })?;

        let rows = value_rows(&body);
        info!(spreadsheet = %self.spreadsheet_id, sheet = sheet_name, rows = rows.len(), "read remote sheet");
        Ok(SheetData::new(rows))
    }

    /// Downloads the spreadsheet as an xlsx workbook to `destination`.
    pub fn download_xlsx(&self, destination: &Path) -> Result<()> {
        let url = self.export_url();
        let response = self.get(&url, "application/octet-stream")?;
        let bytes = response
            .bytes()
            .map_err(|source| IngestError::Http { url, source })?;
        fs::write(destination, &bytes).map_err(|source| IngestError::FileWrite {
            path: destination.to_path_buf(),
            source,
        })?;
        info!(
            spreadsheet = %self.spreadsheet_id,
            path = %destination.display(),
            bytes = bytes.len(),
            "downloaded workbook"
        );
        Ok(())
    }

    fn values_url(&self, sheet_name: &str, range: SheetRange) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API_URL).map_err(|err| IngestError::InvalidUrl {
            url: SHEETS_API_URL.to_string(),
            reason: err.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|()| IngestError::InvalidUrl {
                url: SHEETS_API_URL.to_string(),
                reason: "cannot be a base".to_string(),
            })?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{sheet_name}!{range}"));
        Ok(url)
    }

    fn export_url(&self) -> String {
        format!("{EXPORT_URL}/{}/export?format=xlsx", self.spreadsheet_id)
    }

    fn get(&self, url: &str, accept: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .header(USER_AGENT, format!("mailsheet/{}", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, accept)
            .send()
            .map_err(|source| IngestError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(IngestError::Api {
                url: url.to_string(),
                status,
                message,
            });
        }
        Ok(response)
    }
}

/// Extracts the id from `https://docs.google.com/spreadsheets/d/<ID>/edit`.
fn spreadsheet_id(url: &str) -> Result<String> {
    let invalid = |reason: &str| IngestError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(url).map_err(|err| invalid(&err.to_string()))?;
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(Iterator::collect)
        .unwrap_or_default();
    match segments.as_slice() {
        ["spreadsheets", "d", id, ..] if !id.is_empty() => Ok((*id).to_string()),
        _ => Err(invalid("expected /spreadsheets/d/<ID>/...")),
    }
}

fn value_rows(body: &ValueRange) -> Vec<Vec<String>> {
    body.values
        .iter()
        .map(|row| row.iter().map(value_to_string).collect())
        .collect()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => normalize_date(text),
        Value::Bool(flag) => bool_text(*flag).to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}
