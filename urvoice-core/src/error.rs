//! Error types for UrVoice

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using UrVoice's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in UrVoice
#[derive(Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Operation not allowed while {0}")]
    InvalidState(String),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Self::Audio(err.to_string())
    }
}

/// Coarse classification of an [`Error`], carried by failed results so
/// callers can branch without matching on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Connection refused, DNS failure, timeout
    Network,
    /// HTTP 401 or no session token available
    Unauthorized,
    /// Any other non-2xx status
    Server,
    /// Body did not match the expected envelope
    Decode,
    /// Server answered with `success: false`
    Rejected,
    /// Failure that never left the device (storage, audio, bad input)
    Local,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(e) if e.is_decode() => ErrorKind::Decode,
            Self::Network(e) => match e.status() {
                Some(status) if status.as_u16() == 401 => ErrorKind::Unauthorized,
                Some(_) => ErrorKind::Server,
                None => ErrorKind::Network,
            },
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Server { .. } => ErrorKind::Server,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Rejected(_) => ErrorKind::Rejected,
            Self::Storage(_)
            | Self::Config(_)
            | Self::InvalidInput(_)
            | Self::InvalidState(_)
            | Self::Audio(_)
            | Self::Io(_) => ErrorKind::Local,
        }
    }

}

/// The failure half of an `AsyncResult`: a kind plus a human readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<Error> for Failure {
    fn from(err: Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
