//! Core domain models for the pipeline dashboard.
//!
//! This module contains the task model, the static registry of pipeline
//! tasks and ingestion sources, and the warehouse schema catalog.

pub mod registry;
pub mod schema;
pub mod task;

pub use registry::{default_sources, default_tasks, IngestionSource, SourceCatalog};
pub use schema::{default_schema, Column, KeyKind, SchemaTable, TableKind};
pub use task::{Task, TaskCategory, TaskId, TaskStatus};
