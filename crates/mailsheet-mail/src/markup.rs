//! Body template markup modes.

use serde::Deserialize;

use mailsheet_core::{BodyFormatter, escape_html};
use mailsheet_model::BodyFormat;

/// How the `message` template in the credentials file is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateMarkup {
    /// HTML, sent as written.
    #[default]
    Html,
    /// Plain text, sent as a plain text body.
    Plain,
    /// Plain text, converted with [`text_to_html`] and sent as HTML.
    Text,
}

impl TemplateMarkup {
    /// Content type of the sent body.
    pub const fn body_format(self) -> BodyFormat {
        match self {
            Self::Html | Self::Text => BodyFormat::Html,
            Self::Plain => BodyFormat::Plain,
        }
    }

    /// Conversion applied to the template before substitution.
    pub fn formatter(self) -> Option<BodyFormatter> {
        match self {
            Self::Text => Some(text_to_html),
            Self::Html | Self::Plain => None,
        }
    }
}

/// Escapes HTML special characters and turns line breaks into `<br/>`.
///
/// Placeholder tokens such as `{data}` pass through untouched.
pub fn text_to_html(text: &str) -> String {
    escape_html(text)
        .replace("\r\n", "\n")
        .replace(['\r', '\n'], BodyFormat::Html.line_break())
}
