//! HTTP fetcher behaviour against a mock source.

use std::net::TcpListener;
use std::time::Duration;

use serde_json::json;
use wiremock::ResponseTemplate;

use datapipe::error::IngestErrorKind;
use datapipe::pipeline::{Fetcher, HttpFetcher, Payload};

use crate::fixtures::{http_fetcher, SourceServer, BANK_PATH, NEWS_PATH};

#[tokio::test]
async fn test_array_body_counts_items() {
    let sources = SourceServer::start().await;
    sources
        .respond(BANK_PATH, ResponseTemplate::new(200).set_body_json(json!([{}, [], 3])))
        .await;

    let payload = http_fetcher().fetch(&sources.url(BANK_PATH)).await.unwrap();
    assert_eq!(payload, Payload::Items(3));
}

#[tokio::test]
async fn test_top_news_object() {
    let sources = SourceServer::start().await;
    sources
        .respond(
            NEWS_PATH,
            ResponseTemplate::new(200).set_body_json(json!({ "top_news": [], "language": "en" })),
        )
        .await;

    let payload = http_fetcher().fetch(&sources.url(NEWS_PATH)).await.unwrap();
    assert_eq!(payload, Payload::TopNews);
}

#[tokio::test]
async fn test_non_success_status_is_reported() {
    let sources = SourceServer::start().await;
    sources.respond(NEWS_PATH, ResponseTemplate::new(404)).await;

    let err = http_fetcher().fetch(&sources.url(NEWS_PATH)).await.unwrap_err();
    assert_eq!(err.kind, IngestErrorKind::HttpStatus(404));
    assert_eq!(err.to_string(), "HTTP Error 404");
}

#[tokio::test]
async fn test_error_status_with_json_body_still_fails() {
    let sources = SourceServer::start().await;
    sources
        .respond(
            NEWS_PATH,
            ResponseTemplate::new(401).set_body_json(json!({ "message": "invalid api key" })),
        )
        .await;

    let err = http_fetcher().fetch(&sources.url(NEWS_PATH)).await.unwrap_err();
    assert_eq!(err.kind, IngestErrorKind::HttpStatus(401));
}

#[tokio::test]
async fn test_invalid_json_is_a_decode_error() {
    let sources = SourceServer::start().await;
    sources
        .respond(BANK_PATH, ResponseTemplate::new(200).set_body_string("not json"))
        .await;

    let err = http_fetcher().fetch(&sources.url(BANK_PATH)).await.unwrap_err();
    assert_eq!(err.kind, IngestErrorKind::Decode);
}

#[tokio::test]
async fn test_unreachable_host_is_a_network_error() {
    // Bound then released: nothing listens on this port.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = format!("http://127.0.0.1:{}{}", port, NEWS_PATH);

    let err = http_fetcher().fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, IngestErrorKind::Network);
}

#[tokio::test]
async fn test_slow_source_times_out() {
    let sources = SourceServer::start().await;
    sources
        .respond(
            NEWS_PATH,
            ResponseTemplate::new(200)
                .set_body_json(json!({ "top_news": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .await;

    let fetcher = HttpFetcher::new(Duration::from_millis(100)).unwrap();
    let err = fetcher.fetch(&sources.url(NEWS_PATH)).await.unwrap_err();
    assert_eq!(err.kind, IngestErrorKind::Network);
}
