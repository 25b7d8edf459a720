//! Task data model for the simulated pipeline.
//!
//! Tasks are the units the runner walks through. Each task tracks its
//! category, status and the wall-clock window of its last execution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identifier of a pipeline task, e.g. `extract_world_bank`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Pipeline stage a task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskCategory {
    Ingestion,
    Processing,
    Storage,
    Analytics,
}

impl TaskCategory {
    /// All categories in the order the DAG view lays them out.
    pub const ALL: [TaskCategory; 4] = [
        TaskCategory::Ingestion,
        TaskCategory::Processing,
        TaskCategory::Storage,
        TaskCategory::Analytics,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TaskCategory::Ingestion => "Ingestion",
            TaskCategory::Processing => "Processing",
            TaskCategory::Storage => "Storage",
            TaskCategory::Analytics => "Analytics",
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Task status within a run.
///
/// ```text
/// Idle ──► Running ──► Success
///   │          └─────► Failed
///   └────► Skipped
/// ```
///
/// Only `reset` moves a task back to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    Success,
    Failed,
    Skipped,
}

impl TaskStatus {
    /// Success, Failed and Skipped end a task's part in a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Success | TaskStatus::Failed | TaskStatus::Skipped
        )
    }

    /// Whether `self -> next` is a legal move inside a single run.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Idle, TaskStatus::Running)
                | (TaskStatus::Idle, TaskStatus::Skipped)
                | (TaskStatus::Running, TaskStatus::Success)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Idle => "IDLE",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Success => "SUCCESS",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Skipped => "SKIPPED",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single task in the pipeline registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// Human-readable name for the task.
    pub name: String,
    /// Pipeline stage.
    pub category: TaskCategory,
    /// Current execution status.
    pub status: TaskStatus,
    /// Declared upstream tasks. Informational only; the runner walks the
    /// registry in declaration order.
    pub dependencies: Vec<TaskId>,
    /// When the task last entered Running.
    pub started_at: Option<DateTime<Utc>>,
    /// When the task last reached a terminal status.
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create an Idle task with no timing information.
    pub fn new(id: &str, name: &str, category: TaskCategory, dependencies: &[&str]) -> Self {
        Self {
            id: TaskId::new(id),
            name: name.to_string(),
            category,
            status: TaskStatus::Idle,
            dependencies: dependencies.iter().map(|d| TaskId::new(*d)).collect(),
            started_at: None,
            finished_at: None,
        }
    }

    /// Put the task back to Idle ahead of a new run.
    pub fn reset(&mut self) {
        self.status = TaskStatus::Idle;
        self.started_at = None;
        self.finished_at = None;
    }

    /// Move to `next`, stamping start/finish times.
    ///
    /// # Errors
    /// Returns `Error::InvalidTransition` for any move not allowed by
    /// [`TaskStatus::can_transition_to`]. Setting the current status again
    /// is accepted as a no-op.
    pub fn transition(&mut self, next: TaskStatus) -> Result<()> {
        if self.status == next {
            return Ok(());
        }
        if next == TaskStatus::Idle {
            self.reset();
            return Ok(());
        }
        if !self.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                task: self.id.to_string(),
                from: self.status,
                to: next,
            });
        }
        let now = Utc::now();
        if next == TaskStatus::Running {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.finished_at = Some(now);
        }
        self.status = next;
        Ok(())
    }

    /// Elapsed time of the last execution, if it started.
    ///
    /// For a running task this is measured against `now`.
    pub fn duration(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let start = self.started_at?;
        Some(self.finished_at.unwrap_or(now) - start)
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
