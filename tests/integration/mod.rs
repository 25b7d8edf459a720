//! Integration test suite for datapipe.
//!
//! These tests drive the runner, the ingestion fetcher, the insights client
//! and the headless mode against local mock HTTP servers.
//!
//! # Test Categories
//!
//! - `pipeline_run`: Full runs over the registered task list
//! - `ingestion`: HTTP fetcher status and payload handling
//! - `insights`: Insights endpoint request shape and fallbacks
//! - `headless`: One-shot runs without the TUI
//!
//! # CI Compatibility
//!
//! No test reaches the network; every endpoint is a `wiremock` server.

mod fixtures;

mod headless;
mod ingestion;
mod insights;
mod pipeline_run;
