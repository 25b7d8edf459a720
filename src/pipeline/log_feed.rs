//! User-facing execution log shown in the orchestration view.

use chrono::{DateTime, Local};

/// Display class of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Plain,
    /// Fetch traffic and successes.
    Highlight,
    Error,
}

/// One immutable line of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// `None` for system banners that predate any run.
    pub at: Option<DateTime<Local>>,
    pub message: String,
}

impl LogEntry {
    /// Entry stamped with the current local time.
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            at: Some(Local::now()),
            message: message.into(),
        }
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self {
            at: None,
            message: message.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        let m = &self.message;
        if m.contains("FAILED") || m.contains("ERROR") {
            Severity::Error
        } else if m.contains("SUCCESS") || m.contains("FETCH") {
            Severity::Highlight
        } else {
            Severity::Plain
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.at {
            Some(at) => write!(f, "[{}] {}", at.format("%H:%M:%S"), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Append-only sequence of log entries. `clear` is the only removal.
#[derive(Debug, Clone, Default)]
pub struct LogFeed {
    entries: Vec<LogEntry>,
}

impl LogFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed holding the startup banner.
    pub fn with_banner() -> Self {
        let mut feed = Self::new();
        feed.push(LogEntry::system(
            "[SYSTEM] Pipeline initialized. Ready for execution.",
        ));
        feed
    }

    pub fn push(&mut self, entry: LogEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The last `n` entries (fewer if the feed is shorter).
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}
