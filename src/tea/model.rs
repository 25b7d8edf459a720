//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state - no channels, no handles, no runtime infrastructure.

use chrono::Utc;

use crate::config::Config;
use crate::core::registry::default_tasks;
use crate::core::schema::{default_schema, SchemaTable};
use crate::insights::INITIAL_INSIGHT;
use crate::metrics::{MetricSample, MetricsSummary};
use crate::pipeline::{PipelineState, RunOutcome};
use crate::render::{next_version, LogLineView, RenderState, TaskView, LOG_VIEW_LIMIT};

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Displayed in red with an "Error:" prefix
    Error,
    /// Displayed in green
    Info,
}

/// A notification message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Top-level screens, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Orchestration,
    Analytics,
    Schema,
}

impl View {
    pub const ALL: [View; 3] = [View::Orchestration, View::Analytics, View::Schema];

    pub fn label(&self) -> &'static str {
        match self {
            View::Orchestration => "DAG Orchestration",
            View::Analytics => "Analytics",
            View::Schema => "Data Schema",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Orchestration => 0,
            View::Analytics => 1,
            View::Schema => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::ALL.get(index).copied()
    }

    pub fn next(&self) -> View {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> View {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Pure application state - the single source of truth.
pub struct Model {
    pub view: View,
    pub pipeline: PipelineState,
    pub selected: usize,

    /// Generated once at startup.
    pub metrics: Vec<MetricSample>,
    pub metrics_summary: MetricsSummary,
    pub schema: Vec<SchemaTable>,

    pub insight: String,
    pub insights_loading: bool,

    /// Single in-flight run guard.
    pub is_running: bool,
    pub last_outcome: Option<RunOutcome>,

    pub notification: Option<Notification>,
    pub show_keymap: bool,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    // Config (immutable after init)
    pub config: Config,
}

impl Model {
    pub fn new(config: Config, metrics: Vec<MetricSample>) -> Self {
        let metrics_summary = MetricsSummary::from_samples(&metrics);
        Self {
            view: View::default(),
            pipeline: PipelineState::new(default_tasks()),
            selected: 0,
            metrics,
            metrics_summary,
            schema: default_schema(),
            insight: INITIAL_INSIGHT.to_string(),
            insights_loading: false,
            is_running: false,
            last_outcome: None,
            notification: None,
            show_keymap: false,
            dirty: true,
            config,
        }
    }

    /// Create an immutable snapshot for the render thread.
    ///
    /// Each snapshot gets a monotonically increasing version number so the
    /// render thread can skip redundant draws.
    pub fn snapshot(&self) -> RenderState {
        let now = Utc::now();
        let tasks = self
            .pipeline
            .tasks
            .iter()
            .map(|t| TaskView {
                id: t.id.to_string(),
                name: t.name.clone(),
                category: t.category,
                status: t.status,
                dependencies: t.dependencies.iter().map(|d| d.to_string()).collect(),
                elapsed: t.duration(now),
            })
            .collect();

        let entries = self.pipeline.logs.entries();
        let first = entries.len().saturating_sub(LOG_VIEW_LIMIT);
        let logs = entries[first..]
            .iter()
            .enumerate()
            .map(|(offset, entry)| LogLineView {
                index: first + offset,
                text: entry.to_string(),
                severity: entry.severity(),
            })
            .collect();

        RenderState {
            version: next_version(),
            view: self.view,
            tasks,
            selected: self.selected,
            logs,
            throughput: self.metrics.iter().map(|s| s.throughput.round() as u64).collect(),
            latency: self.metrics.iter().map(|s| s.latency.round() as u64).collect(),
            summary: self.metrics_summary,
            schema: self.schema.clone(),
            insight: self.insight.clone(),
            insights_loading: self.insights_loading,
            is_running: self.is_running,
            last_outcome: self.last_outcome,
            notification: self.notification.clone(),
            show_keymap: self.show_keymap,
        }
    }
}
