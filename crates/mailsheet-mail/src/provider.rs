//! SMTP provider presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MailError, Result};

/// Default submission port.
pub const DEFAULT_PORT: u16 = 587;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    #[default]
    StartTls,
    /// Implicit TLS, usually on port 465.
    Tls,
    /// Plain text. Only for local test relays.
    None,
}

/// Relay host, port and TLS mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub tls: TlsMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Outlook,
    Gmail,
    /// Host and port come from the credentials file.
    Custom,
}

impl Provider {
    /// Preset relay for named providers, `None` for [`Provider::Custom`].
    pub fn preset(self) -> Option<SmtpSettings> {
        let host = match self {
            Self::Outlook => "smtp.office365.com",
            Self::Gmail => "smtp.gmail.com",
            Self::Custom => return None,
        };
        Some(SmtpSettings {
            host: host.to_string(),
            port: DEFAULT_PORT,
            tls: TlsMode::StartTls,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Outlook => "outlook",
            Self::Gmail => "gmail",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for Provider {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "outlook" => Ok(Self::Outlook),
            "gmail" => Ok(Self::Gmail),
            "custom" => Ok(Self::Custom),
            _ => Err(MailError::UnknownProvider(s.to_string())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
