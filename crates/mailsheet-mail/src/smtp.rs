//! SMTP delivery through lettre.

use lettre::message::header::ContentType;
use lettre::message::{Attachment as MimeAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::debug;

use mailsheet_core::{BoxError, DeliverySink};
use mailsheet_model::{BodyFormat, PreparedMessage};

use crate::credentials::MailCredentials;
use crate::error::{MailError, Result};
use crate::provider::{SmtpSettings, TlsMode};

/// Delivery sink that sends each message over one pooled SMTP transport.
pub struct SmtpSink {
    transport: SmtpTransport,
    relay: String,
}

impl SmtpSink {
    /// Builds a transport for `settings` authenticated as `username`.
    ///
    /// No connection is opened until the first message is sent.
    pub fn connect(settings: &SmtpSettings, username: &str, password: &str) -> Result<Self> {
        let builder = match settings.tls {
            TlsMode::StartTls => SmtpTransport::starttls_relay(&settings.host)
                .map_err(|err| MailError::Smtp(err.to_string()))?,
            TlsMode::Tls => SmtpTransport::relay(&settings.host)
                .map_err(|err| MailError::Smtp(err.to_string()))?,
            TlsMode::None => SmtpTransport::builder_dangerous(&settings.host),
        };
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self {
            transport,
            relay: format!("{}:{}", settings.host, settings.port),
        })
    }

    pub fn from_credentials(credentials: &MailCredentials) -> Result<Self> {
        Self::connect(
            &credentials.smtp,
            &credentials.username,
            &credentials.app_password,
        )
    }

    pub fn relay(&self) -> &str {
        &self.relay
    }
}

impl DeliverySink for SmtpSink {
    fn send(&mut self, message: &PreparedMessage) -> std::result::Result<(), BoxError> {
        let email = build_message(message)?;
        let response = self
            .transport
            .send(&email)
            .map_err(|err| MailError::Smtp(err.to_string()))?;
        debug!(row = message.row, code = %response.code(), relay = %self.relay, "message accepted");
        Ok(())
    }
}

/// Converts a prepared message into a MIME message.
///
/// # Errors
///
/// Fails on unparsable addresses or an invalid attachment MIME type.
pub fn build_message(message: &PreparedMessage) -> Result<Message> {
    let mut builder = Message::builder()
        .from(mailbox(&message.sender)?)
        .subject(message.subject.as_str());
    for address in &message.to {
        builder = builder.to(mailbox(address)?);
    }
    for address in &message.cc {
        builder = builder.cc(mailbox(address)?);
    }

    let body = match message.format {
        BodyFormat::Html => SinglePart::html(message.body.clone()),
        BodyFormat::Plain => SinglePart::plain(message.body.clone()),
    };
    let built = match &message.attachment {
        Some(attachment) => {
            let content_type = ContentType::parse(&attachment.mime_type)
                .map_err(|err| MailError::Build(err.to_string()))?;
            let file = MimeAttachment::new(attachment.file_name.clone())
                .body(attachment.content.clone(), content_type);
            builder.multipart(MultiPart::mixed().singlepart(body).singlepart(file))
        }
        None => builder.singlepart(body),
    };
    built.map_err(|err| MailError::Build(err.to_string()))
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|_| MailError::InvalidAddress(address.to_string()))
}
