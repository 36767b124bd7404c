//! Mail delivery for mailsheet.
//!
//! Loads the credentials file, resolves the SMTP relay for the configured
//! provider and sends prepared messages with [lettre](https://lettre.rs).

mod credentials;
mod error;
mod markup;
mod provider;
mod smtp;

pub use credentials::MailCredentials;
pub use error::{MailError, Result};
pub use markup::{TemplateMarkup, text_to_html};
pub use provider::{DEFAULT_PORT, Provider, SmtpSettings, TlsMode};
pub use smtp::{SmtpSink, build_message};
