//! Error types for the core library

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("no more tasks")]
    Drained,

    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Stable error category carried in failure envelopes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Transport,
    Protocol,
    Drained,
    InvalidArgs,
    Internal,
}

impl Error {
    /// Category used as the `kind` field of failure envelopes
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::Config,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Protocol(_) => ErrorKind::Protocol,
            Error::Drained => ErrorKind::Drained,
            Error::InvalidArgs(_) => ErrorKind::InvalidArgs,
            Error::Io(_) | Error::Serialization(_) => ErrorKind::Internal,
        }
    }
}
