//! Mail error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("failed to read credentials {path}: {source}")]
    ReadCredentials {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("missing required credentials field: {0}")]
    MissingField(&'static str),

    #[error("unknown mail provider '{0}' (expected outlook, gmail or custom)")]
    UnknownProvider(String),

    #[error("missing required config: {0}")]
    MissingConfig(String),

    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Smtp(String),
}

pub type Result<T> = std::result::Result<T, MailError>;
