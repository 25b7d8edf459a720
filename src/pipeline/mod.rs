//! Pipeline execution: the sequential runner, its ingestion fetcher, the
//! user-facing log feed and the event-folding state.

pub mod ingest;
pub mod log_feed;
pub mod runner;
pub mod state;

pub use ingest::{Fetcher, HttpFetcher, Payload};
pub use log_feed::{LogEntry, LogFeed, Severity};
pub use runner::{RunSettings, TaskRunner};
pub use state::{PipelineState, RunEvent, RunOutcome, RunSummary};
