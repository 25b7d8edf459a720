//! Full pipeline runs over the registered task list.

use tokio::sync::mpsc;
use wiremock::ResponseTemplate;

use datapipe::core::registry::default_tasks;
use datapipe::core::task::TaskStatus;
use datapipe::pipeline::{PipelineState, RunEvent, RunOutcome};

use crate::fixtures::{
    drain, log_lines, reliable_runner, SourceServer, BANK_PATH, NEWS_PATH, PONY_PATH,
};

/// Test: Happy path
/// Given all three sources answer 200
/// When the pipeline runs
/// Then every task succeeds and the feed ends with COMPLETED
#[tokio::test]
async fn test_run_completes_with_healthy_sources() {
    let sources = SourceServer::healthy().await;
    let mut runner = reliable_runner(&sources);
    let (tx, rx) = mpsc::unbounded_channel();

    let summary = runner.run(default_tasks(), &tx).await;
    drop(tx);
    let events = drain(rx).await;

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!(summary.count(TaskStatus::Success), 7);
    assert!(summary.finished_at >= summary.started_at);

    let lines = log_lines(&events);
    assert!(lines.contains(&"[FETCH] Requesting World News API...".to_string()));
    assert!(lines.contains(&"[FETCH] Received top news articles from World News API.".to_string()));
    assert!(lines.contains(&"[FETCH] Received 2 items from World Bank Regions API.".to_string()));
    assert!(lines.contains(&"[FETCH] Success! Received payload from PonyAPI Characters.".to_string()));
    assert_eq!(lines.last().map(String::as_str), Some("Pipeline run COMPLETED."));
}

/// Test: Ingestion failure halts the run
/// Given the World News source answers 500
/// When the pipeline runs
/// Then the first task fails and the other six are skipped
#[tokio::test]
async fn test_first_ingestion_failure_skips_everything_after() {
    let sources = SourceServer::start().await;
    sources.respond(NEWS_PATH, ResponseTemplate::new(500)).await;
    sources.respond(BANK_PATH, ResponseTemplate::new(200).set_body_string("[]")).await;
    sources.respond(PONY_PATH, ResponseTemplate::new(200).set_body_string("{}")).await;

    let mut runner = reliable_runner(&sources);
    let (tx, rx) = mpsc::unbounded_channel();
    let summary = runner.run(default_tasks(), &tx).await;
    drop(tx);
    let events = drain(rx).await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.tasks[0].status, TaskStatus::Failed);
    assert_eq!(summary.count(TaskStatus::Skipped), 6);

    let lines = log_lines(&events);
    assert!(lines.contains(
        &"[ERROR] World News API failed: HTTP Error 500. Check for CORS or Network issues."
            .to_string()
    ));
    assert!(lines.contains(
        &"Pipeline execution halted at task: World News API (Top US News)".to_string()
    ));
    assert_eq!(lines.last().map(String::as_str), Some("Pipeline run FAILED."));

    // Skipped tasks were never requested.
    let requests = sources.server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 1);
}

/// Test: Undecodable body
/// Given the World Bank source answers 200 with HTML
/// When the pipeline runs
/// Then that task fails as a decode error
#[tokio::test]
async fn test_non_json_body_fails_the_task() {
    let sources = SourceServer::start().await;
    sources
        .respond(NEWS_PATH, ResponseTemplate::new(200).set_body_string("{\"top_news\": []}"))
        .await;
    sources
        .respond(
            BANK_PATH,
            ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
        )
        .await;

    let mut runner = reliable_runner(&sources);
    let (tx, rx) = mpsc::unbounded_channel();
    let summary = runner.run(default_tasks(), &tx).await;
    drop(tx);
    let events = drain(rx).await;

    assert_eq!(summary.outcome, RunOutcome::Failed);
    assert_eq!(summary.tasks[0].status, TaskStatus::Success);
    assert_eq!(summary.tasks[1].status, TaskStatus::Failed);
    assert!(log_lines(&events)
        .iter()
        .any(|l| l.starts_with("[ERROR] World Bank Regions API failed:")));
}

/// Test: Events rebuild the dashboard state
/// Given a completed run
/// When its events are folded into a fresh state
/// Then the state matches the summary and keeps every log line
#[tokio::test]
async fn test_events_rebuild_state() {
    let sources = SourceServer::healthy().await;
    let mut runner = reliable_runner(&sources);
    let (tx, rx) = mpsc::unbounded_channel();
    let summary = runner.run(default_tasks(), &tx).await;
    drop(tx);
    let events = drain(rx).await;

    let mut state = PipelineState::new(default_tasks());
    let banner_lines = state.logs.len();
    let log_count = events.iter().filter(|e| matches!(e, RunEvent::Log(_))).count();
    for event in events {
        state.apply(event).unwrap();
    }

    assert!(state.all_finished());
    assert_eq!(state.logs.len(), banner_lines + log_count);
    for (task, expected) in state.tasks.iter().zip(&summary.tasks) {
        assert_eq!(task.status, expected.status, "status mismatch for {}", task.id);
        assert!(task.started_at.is_some());
    }
}

/// Test: Back-to-back runs
/// Given a runner that already completed once
/// When it runs again
/// Then statuses reset first and the new run gets its own id
#[tokio::test]
async fn test_second_run_resets_tasks() {
    let sources = SourceServer::healthy().await;
    let mut runner = reliable_runner(&sources);

    let (tx, _rx) = mpsc::unbounded_channel();
    let first = runner.run(default_tasks(), &tx).await;

    let (tx, rx) = mpsc::unbounded_channel();
    let second = runner.run(first.tasks.clone(), &tx).await;
    drop(tx);
    let events = drain(rx).await;

    assert_ne!(first.run_id, second.run_id);
    assert!(matches!(events.first(), Some(RunEvent::Reset)));
    assert_eq!(second.outcome, RunOutcome::Completed);
}
