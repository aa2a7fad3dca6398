use thiserror::Error;

use crate::StkVersion;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Timed out waiting for reply to '{0}'")]
    Timeout(String),
    #[error("Command rejected: '{command}': {detail}")]
    Nack { command: String, detail: String },
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("No supported STK version could be attached (tried {tried:?})")]
    NoSupportedVersion { tried: Vec<StkVersion> },
    #[error("Version mismatch: expected STK {expected}, application reported '{reported}'")]
    VersionMismatch { expected: StkVersion, reported: String },
    #[error("Invalid date {0}")]
    InvalidDate(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, ConnectError>;

impl ConnectError {
    /// Rejection of `command` by the application
    pub fn nack(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Nack {
            command: command.into(),
            detail: detail.into(),
        }
    }
}
