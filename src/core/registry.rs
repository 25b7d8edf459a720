//! Static pipeline definition: the task list and the ingestion sources.

use serde::{Deserialize, Serialize};

use super::task::{Task, TaskCategory, TaskId};

/// An HTTP endpoint pulled by an Ingestion task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionSource {
    pub task_id: TaskId,
    /// Human-readable name used in log lines.
    pub description: String,
    pub url: String,
}

impl IngestionSource {
    pub fn new(task_id: &str, description: &str, url: &str) -> Self {
        Self {
            task_id: TaskId::new(task_id),
            description: description.to_string(),
            url: url.to_string(),
        }
    }
}

/// The pipeline tasks in execution order.
pub fn default_tasks() -> Vec<Task> {
    vec![
        Task::new(
            "extract_world_news",
            "World News API (Top US News)",
            TaskCategory::Ingestion,
            &[],
        ),
        Task::new(
            "extract_world_bank",
            "World Bank Regions API",
            TaskCategory::Ingestion,
            &[],
        ),
        Task::new(
            "extract_pony_api",
            "PonyAPI Characters",
            TaskCategory::Ingestion,
            &[],
        ),
        Task::new(
            "clean_and_merge",
            "Pandas Data Merge & Cleaning",
            TaskCategory::Processing,
            &["extract_world_news", "extract_world_bank", "extract_pony_api"],
        ),
        Task::new(
            "spark_transform",
            "PySpark Sentiment Analysis",
            TaskCategory::Processing,
            &["clean_and_merge"],
        ),
        Task::new(
            "load_dw",
            "PostgreSQL DW Sync",
            TaskCategory::Storage,
            &["spark_transform"],
        ),
        Task::new(
            "refresh_dashboards",
            "Dashboard Cache Update",
            TaskCategory::Analytics,
            &["load_dw"],
        ),
    ]
}

/// Endpoints for the built-in Ingestion tasks.
///
/// The World News API needs an `api-key` query parameter; it is appended
/// from the environment at startup (see `Config::resolved_sources`).
pub fn default_sources() -> Vec<IngestionSource> {
    vec![
        IngestionSource::new(
            "extract_world_news",
            "World News API",
            "https://api.worldnewsapi.com/top-news?source-country=us&language=en",
        ),
        IngestionSource::new(
            "extract_world_bank",
            "World Bank Regions API",
            "https://api.worldbank.org/v2/region?format=json",
        ),
        IngestionSource::new(
            "extract_pony_api",
            "PonyAPI Characters",
            "https://ponyapi.net/v1/character/all",
        ),
    ]
}

/// Lookup table from task id to ingestion source.
#[derive(Debug, Clone, Default)]
pub struct SourceCatalog {
    sources: Vec<IngestionSource>,
}

impl SourceCatalog {
    pub fn new(sources: Vec<IngestionSource>) -> Self {
        Self { sources }
    }

    pub fn get(&self, task_id: &TaskId) -> Option<&IngestionSource> {
        self.sources.iter().find(|s| &s.task_id == task_id)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
