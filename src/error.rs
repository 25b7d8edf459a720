use thiserror::Error;

use crate::core::task::TaskStatus;

/// What went wrong while pulling an ingestion source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestErrorKind {
    /// Connection refused, DNS failure, timeout and friends.
    Network,
    /// The server answered with a non-2xx status.
    HttpStatus(u16),
    /// The body could not be decoded as JSON.
    Decode,
}

/// Failure of a single ingestion request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct IngestError {
    pub kind: IngestErrorKind,
    pub message: String,
}

impl IngestError {
    pub fn new(kind: IngestErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn http_status(code: u16) -> Self {
        Self::new(IngestErrorKind::HttpStatus(code), format!("HTTP Error {code}"))
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::new(IngestErrorKind::Decode, err.to_string())
        } else if let Some(status) = err.status() {
            Self::http_status(status.as_u16())
        } else {
            Self::new(IngestErrorKind::Network, err.to_string())
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid status transition for task {task}: {from} -> {to}")]
    InvalidTransition {
        task: String,
        from: TaskStatus,
        to: TaskStatus,
    },

    #[error("Insights error: {0}")]
    Insights(String),

    #[error("Missing API key: environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("Task join error: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, Error>;
