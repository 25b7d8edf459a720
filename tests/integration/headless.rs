//! One-shot runs through `headless::run_once`.

use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use datapipe::app::Services;
use datapipe::core::registry::default_tasks;
use datapipe::headless;
use datapipe::insights::GeminiClient;
use datapipe::pipeline::{PipelineState, RunOutcome};

use crate::fixtures::{reliable_runner, SourceServer, NEWS_PATH};

async fn insights_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-test:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "All stages healthy." }] } }]
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_run_once_streams_logs_and_reports() {
    let sources = SourceServer::healthy().await;
    let llm = insights_server().await;
    let services = Services::new(
        reliable_runner(&sources),
        Arc::new(GeminiClient::new(&llm.uri(), "gemini-test", Some("k".to_string()))),
    );

    let mut out = Vec::new();
    let report = headless::run_once(&services, PipelineState::new(default_tasks()), true, &mut out)
        .await
        .unwrap();

    assert_eq!(report.summary.outcome, RunOutcome::Completed);
    assert_eq!(report.insight.as_deref(), Some("All stages healthy."));

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Pipeline run started."));
    assert!(printed.lines().last().unwrap().ends_with("Pipeline run COMPLETED."));

    let value: Value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["outcome"], json!("COMPLETED"));
    assert_eq!(value["insight"], json!("All stages healthy."));
    assert_eq!(value["tasks"].as_array().map(Vec::len), Some(7));
}

#[tokio::test]
async fn test_run_once_without_insights() {
    let sources = SourceServer::start().await;
    sources.respond(NEWS_PATH, ResponseTemplate::new(503)).await;
    let llm = insights_server().await;
    let services = Services::new(
        reliable_runner(&sources),
        Arc::new(GeminiClient::new(&llm.uri(), "gemini-test", Some("k".to_string()))),
    );

    let mut out = Vec::new();
    let report = headless::run_once(&services, PipelineState::new(default_tasks()), false, &mut out)
        .await
        .unwrap();

    assert_eq!(report.summary.outcome, RunOutcome::Failed);
    assert!(report.insight.is_none());
    let value: Value = serde_json::to_value(&report).unwrap();
    assert!(value.get("insight").is_none());

    let requests = llm.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}
