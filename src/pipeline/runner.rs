//! Sequential task runner.
//!
//! Walks the task list in the order given. Declared dependencies are never
//! consulted. Ingestion tasks pull their source over HTTP; every other task
//! sleeps for a randomized duration and then succeeds unless a draw falls
//! under the failure rate. The first failure turns every remaining task into
//! Skipped. There are no retries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::Config;
use crate::core::registry::SourceCatalog;
use crate::core::task::{Task, TaskCategory, TaskStatus};
use crate::random::RandomSource;
use crate::{dlog, dlog_debug, dlog_warn};

use super::ingest::Fetcher;
use super::log_feed::LogEntry;
use super::state::{RunEvent, RunOutcome, RunSummary};

/// Timing and odds for simulated steps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub step_delay: Duration,
    pub step_jitter: Duration,
    pub failure_rate: f64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            step_delay: Duration::from_millis(1500),
            step_jitter: Duration::from_millis(1000),
            failure_rate: 0.02,
        }
    }
}

impl RunSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            step_delay: config.step_delay(),
            step_jitter: config.step_jitter(),
            failure_rate: config.failure_rate,
        }
    }

    /// No waiting at all; outcomes still come from the random source.
    pub fn instant(failure_rate: f64) -> Self {
        Self {
            step_delay: Duration::ZERO,
            step_jitter: Duration::ZERO,
            failure_rate,
        }
    }
}

pub struct TaskRunner {
    fetcher: Arc<dyn Fetcher>,
    sources: SourceCatalog,
    random: Box<dyn RandomSource>,
    settings: RunSettings,
}

impl TaskRunner {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        sources: SourceCatalog,
        random: Box<dyn RandomSource>,
        settings: RunSettings,
    ) -> Self {
        Self {
            fetcher,
            sources,
            random,
            settings,
        }
    }

    /// Execute one run over `tasks`, reporting progress on `events`.
    ///
    /// The receiving side may go away at any point; events are then dropped
    /// and the run still completes. The returned summary carries the final
    /// task list.
    pub async fn run(
        &mut self,
        mut tasks: Vec<Task>,
        events: &mpsc::UnboundedSender<RunEvent>,
    ) -> RunSummary {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        dlog!("Run {} started with {} tasks", run_id, tasks.len());

        tasks.iter_mut().for_each(Task::reset);
        emit(events, RunEvent::Reset);
        log(
            events,
            "Pipeline run started. Initializing parallel ingestion...",
        );

        let mut failed = false;
        for idx in 0..tasks.len() {
            if failed {
                set_status(&mut tasks[idx], TaskStatus::Skipped, events);
                continue;
            }

            set_status(&mut tasks[idx], TaskStatus::Running, events);
            log(events, format!("Task '{}' started.", tasks[idx].name));

            let success = self.execute(&tasks[idx], events).await;
            let task = &mut tasks[idx];
            if success {
                set_status(task, TaskStatus::Success, events);
                log(events, format!("Task '{}' finished successfully.", task.name));
            } else {
                set_status(task, TaskStatus::Failed, events);
                log(
                    events,
                    format!("Pipeline execution halted at task: {}", task.name),
                );
                failed = true;
            }
        }

        let outcome = if failed {
            RunOutcome::Failed
        } else {
            RunOutcome::Completed
        };
        log(events, format!("Pipeline run {}.", outcome));
        dlog!("Run {} finished: {}", run_id, outcome);

        let summary = RunSummary {
            run_id,
            outcome,
            tasks,
            started_at,
            finished_at: Utc::now(),
        };
        emit(events, RunEvent::Finished(summary.clone()));
        summary
    }

    async fn execute(&mut self, task: &Task, events: &mpsc::UnboundedSender<RunEvent>) -> bool {
        match task.category {
            TaskCategory::Ingestion => self.ingest(task, events).await,
            _ => self.simulate(task).await,
        }
    }

    async fn ingest(&self, task: &Task, events: &mpsc::UnboundedSender<RunEvent>) -> bool {
        let Some(source) = self.sources.get(&task.id) else {
            dlog_debug!("No ingestion source for {}, treating as success", task.id);
            return true;
        };

        log(
            events,
            format!("[FETCH] Requesting {}...", source.description),
        );
        match self.fetcher.fetch(&source.url).await {
            Ok(payload) => {
                log(events, payload.describe(&source.description));
                true
            }
            Err(err) => {
                dlog_warn!("Ingestion failed for {}: {}", task.id, err);
                log(
                    events,
                    format!(
                        "[ERROR] {} failed: {}. Check for CORS or Network issues.",
                        source.description, err
                    ),
                );
                false
            }
        }
    }

    async fn simulate(&mut self, task: &Task) -> bool {
        let delay = self.settings.step_delay + self.settings.step_jitter.mul_f64(self.random.next_f64());
        dlog_debug!("Simulating {} for {:?}", task.id, delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.random.next_f64() > self.settings.failure_rate
    }
}

fn emit(events: &mpsc::UnboundedSender<RunEvent>, event: RunEvent) {
    let _ = events.send(event);
}

fn log(events: &mpsc::UnboundedSender<RunEvent>, message: impl Into<String>) {
    emit(events, RunEvent::Log(LogEntry::now(message)));
}

fn set_status(task: &mut Task, status: TaskStatus, events: &mpsc::UnboundedSender<RunEvent>) {
    if let Err(e) = task.transition(status) {
        dlog_warn!("Runner status update rejected: {}", e);
        return;
    }
    emit(
        events,
        RunEvent::Status {
            task_id: task.id.clone(),
            status,
        },
    );
}
