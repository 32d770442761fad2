use std::io;
use std::path::PathBuf;

/// Failure of an open request, as seen by the session.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OpenError {
    #[error("{path} is password protected")]
    PasswordRequired {
        path: String,
        reason: Option<String>,
    },
    #[error("{message}")]
    Failed { message: String },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    #[error("history refresh failed: {message}")]
    Failed { message: String },
}

/// A user action the session refused to act on.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no archive path given")]
    EmptyPath,
    #[error("an open request is already in flight")]
    RequestInFlight,
    #[error("no archive is waiting for a password")]
    NoPendingPassword,
    #[error("no recent file at position {0}")]
    UnknownHistoryEntry(usize),
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("history file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("history capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {message}")]
    InvalidValue {
        key: &'static str,
        value: String,
        message: String,
    },
}
