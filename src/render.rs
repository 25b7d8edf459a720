use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::schema::SchemaTable;
use crate::core::task::{TaskCategory, TaskStatus};
use crate::insights::INITIAL_INSIGHT;
use crate::metrics::MetricsSummary;
use crate::pipeline::{RunOutcome, Severity};
use crate::tea::{Notification, View};

/// Most log lines a snapshot carries; older lines keep their index but are
/// not shipped to the render thread.
pub const LOG_VIEW_LIMIT: usize = 500;

#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: String,
    pub name: String,
    pub category: TaskCategory,
    pub status: TaskStatus,
    pub dependencies: Vec<String>,
    /// Wall time spent so far (running) or in total (finished).
    pub elapsed: Option<chrono::Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogLineView {
    /// Position in the full feed, starting at 0.
    pub index: usize,
    pub text: String,
    pub severity: Severity,
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub view: View,
    pub tasks: Vec<TaskView>,
    pub selected: usize,
    pub logs: Vec<LogLineView>,
    pub throughput: Vec<u64>,
    pub latency: Vec<u64>,
    pub summary: MetricsSummary,
    pub schema: Vec<SchemaTable>,
    pub insight: String,
    pub insights_loading: bool,
    pub is_running: bool,
    pub last_outcome: Option<RunOutcome>,
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
}

impl RenderState {
    /// Tasks of one category, in registry order.
    pub fn tasks_in(&self, category: TaskCategory) -> impl Iterator<Item = (usize, &TaskView)> {
        self.tasks
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.category == category)
    }

    pub fn selected_task(&self) -> Option<&TaskView> {
        self.tasks.get(self.selected)
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            view: View::default(),
            tasks: Vec::new(),
            selected: 0,
            logs: Vec::new(),
            throughput: Vec::new(),
            latency: Vec::new(),
            summary: MetricsSummary::default(),
            schema: Vec::new(),
            insight: INITIAL_INSIGHT.to_string(),
            insights_loading: false,
            is_running: false,
            last_outcome: None,
            notification: None,
            show_keymap: false,
        }
    }
}
