//! Run events and the state they fold into.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::task::{Task, TaskId, TaskStatus};
use crate::error::{Error, Result};

use super::log_feed::{LogEntry, LogFeed};

/// Aggregate result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Completed,
    Failed,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Completed => f.write_str("COMPLETED"),
            RunOutcome::Failed => f.write_str("FAILED"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub outcome: RunOutcome,
    pub tasks: Vec<Task>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }
}

/// Progress reported by the runner, in emission order.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// Every task went back to Idle.
    Reset,
    Status { task_id: TaskId, status: TaskStatus },
    Log(LogEntry),
    Finished(RunSummary),
}

/// Task list plus log feed, owned by whoever drives the UI.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub tasks: Vec<Task>,
    pub logs: LogFeed,
}

impl PipelineState {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            logs: LogFeed::with_banner(),
        }
    }

    /// Fold one runner event into the state.
    ///
    /// # Errors
    /// `Error::Validation` for an unknown task id and
    /// `Error::InvalidTransition` for a status move the task model rejects.
    pub fn apply(&mut self, event: RunEvent) -> Result<()> {
        match event {
            RunEvent::Reset => {
                self.tasks.iter_mut().for_each(Task::reset);
            }
            RunEvent::Status { task_id, status } => {
                let task = self
                    .tasks
                    .iter_mut()
                    .find(|t| t.id == task_id)
                    .ok_or_else(|| Error::Validation(format!("unknown task {}", task_id)))?;
                task.transition(status)?;
            }
            RunEvent::Log(entry) => self.logs.push(entry),
            RunEvent::Finished(_) => {}
        }
        Ok(())
    }

    pub fn all_finished(&self) -> bool {
        self.tasks.iter().all(Task::is_finished)
    }
}
