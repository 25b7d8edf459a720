//! One pipeline run without the TUI.
//!
//! Log lines stream to the given writer as they arrive; the caller gets a
//! report with the final summary and, optionally, the insight text.

use std::io::Write;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::app::Services;
use crate::error::{Error, Result};
use crate::insights::{fetch_insights, InsightSnapshot};
use crate::pipeline::{PipelineState, RunEvent, RunSummary};
use crate::dlog;

#[derive(Debug, Clone, Serialize)]
pub struct HeadlessReport {
    #[serde(flatten)]
    pub summary: RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<String>,
}

pub async fn run_once(
    services: &Services,
    mut state: PipelineState,
    with_insights: bool,
    out: &mut impl Write,
) -> Result<HeadlessReport> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let runner = services.runner.clone();
    let tasks = state.tasks.clone();
    let run = tokio::spawn(async move { runner.lock().await.run(tasks, &event_tx).await });

    while let Some(event) = event_rx.recv().await {
        if let RunEvent::Log(entry) = &event {
            writeln!(out, "{}", entry)?;
        }
        state.apply(event)?;
    }
    let summary = run.await.map_err(|e| Error::TaskJoin(e.to_string()))?;
    dlog!("Headless run {} finished: {}", summary.run_id, summary.outcome);

    let insight = if with_insights {
        let snapshot = InsightSnapshot::capture(&state);
        Some(fetch_insights(services.insights.as_ref(), &snapshot).await)
    } else {
        None
    };

    Ok(HeadlessReport { summary, insight })
}
