//! Insights client against a mock generateContent endpoint.

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use datapipe::core::registry::default_tasks;
use datapipe::error::Error;
use datapipe::insights::{
    fetch_insights, GeminiClient, InsightSnapshot, InsightsClient, EMPTY_INSIGHT,
    FALLBACK_INSIGHT,
};
use datapipe::pipeline::PipelineState;

const MODEL: &str = "gemini-test";
const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn answer(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    }))
}

fn snapshot() -> InsightSnapshot {
    InsightSnapshot::capture(&PipelineState::new(default_tasks()))
}

#[tokio::test]
async fn test_generate_sends_key_and_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "secret"))
        .and(body_string_contains("PySpark Sentiment Analysis"))
        .respond_with(answer("Throughput is healthy."))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri(), MODEL, Some("secret".to_string()));
    let text = fetch_insights(&client, &snapshot()).await;
    assert_eq!(text, "Throughput is healthy.");
}

#[tokio::test]
async fn test_multi_part_answer_is_joined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Ingestion ok. " }, { "text": "No bottlenecks." }] }
            }]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri(), MODEL, Some("k".to_string()));
    let text = client.generate("prompt").await.unwrap();
    assert_eq!(text, "Ingestion ok. No bottlenecks.");
}

#[tokio::test]
async fn test_server_error_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri(), MODEL, Some("k".to_string()));
    assert!(matches!(client.generate("p").await, Err(Error::Insights(_))));
    assert_eq!(fetch_insights(&client, &snapshot()).await, FALLBACK_INSIGHT);
}

#[tokio::test]
async fn test_empty_answer_is_reported_as_such() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(answer(""))
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri(), MODEL, Some("k".to_string()));
    assert_eq!(fetch_insights(&client, &snapshot()).await, EMPTY_INSIGHT);
}

#[tokio::test]
async fn test_missing_key_never_calls_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(answer("unreachable"))
        .expect(0)
        .mount(&server)
        .await;

    let client = GeminiClient::new(&server.uri(), MODEL, None);
    assert!(matches!(client.generate("p").await, Err(Error::MissingApiKey(_))));
    assert_eq!(fetch_insights(&client, &snapshot()).await, FALLBACK_INSIGHT);
}
