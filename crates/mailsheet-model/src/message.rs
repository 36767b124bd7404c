use serde::{Deserialize, Serialize};

/// MIME type of the single-row workbook attached to each message.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Content type of a message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyFormat {
    #[default]
    Html,
    Plain,
}

impl BodyFormat {
    /// Line terminator used when rendering the `{data}` block.
    pub const fn line_break(self) -> &'static str {
        match self {
            Self::Html => "<br/>\n",
            Self::Plain => "\n",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Plain => "plain",
        }
    }
}

/// File attached to a prepared message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    #[serde(skip)]
    pub content: Vec<u8>,
    pub mime_type: String,
}

impl Attachment {
    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// A fully rendered message, ready to hand to a delivery sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedMessage {
    /// 0-based position of the source row among the data rows.
    pub row: usize,
    pub subject: String,
    pub body: String,
    pub format: BodyFormat,
    pub sender: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    #[serde(
        serialize_with = "serialize_attachment",
        skip_deserializing,
        default
    )]
    pub attachment: Option<Attachment>,
}

impl PreparedMessage {
    /// Non-empty `to` and `cc` addresses.
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .map(String::as_str)
            .filter(|address| !address.is_empty())
    }

    pub fn has_recipients(&self) -> bool {
        self.recipients().next().is_some()
    }
}

#[derive(Serialize)]
struct AttachmentSummary<'a> {
    file_name: &'a str,
    mime_type: &'a str,
    size: usize,
}

fn serialize_attachment<S>(attachment: &Option<Attachment>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    attachment
        .as_ref()
        .map(|attachment| AttachmentSummary {
            file_name: &attachment.file_name,
            mime_type: &attachment.mime_type,
            size: attachment.size(),
        })
        .serialize(serializer)
}
