//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Mock ingestion servers answering the three built-in sources
//! - Runners wired to those servers with deterministic outcomes
//! - Draining run events

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use datapipe::core::registry::{IngestionSource, SourceCatalog};
use datapipe::pipeline::{Fetcher, HttpFetcher, RunEvent, RunSettings, TaskRunner};
use datapipe::random::FixedRandom;

pub const NEWS_PATH: &str = "/top-news";
pub const BANK_PATH: &str = "/v2/region";
pub const PONY_PATH: &str = "/v1/character/all";

/// Mock server standing in for all three ingestion endpoints.
pub struct SourceServer {
    pub server: MockServer,
}

impl SourceServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Every source answers 200 with a realistic body.
    pub async fn healthy() -> Self {
        let this = Self::start().await;
        this.respond(NEWS_PATH, ResponseTemplate::new(200).set_body_json(json!({
            "top_news": [{ "news": [{ "title": "Markets rally" }] }],
            "language": "en",
            "country": "us"
        })))
        .await;
        this.respond(BANK_PATH, ResponseTemplate::new(200).set_body_json(json!([
            { "page": 1, "pages": 1, "per_page": 50, "total": 2 },
            [{ "id": "AFR" }, { "id": "EAS" }]
        ])))
        .await;
        this.respond(PONY_PATH, ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "data": [{ "name": "Twilight Sparkle" }]
        })))
        .await;
        this
    }

    pub async fn respond(&self, route: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.server.uri(), route)
    }

    pub fn catalog(&self) -> SourceCatalog {
        SourceCatalog::new(vec![
            IngestionSource::new("extract_world_news", "World News API", &self.url(NEWS_PATH)),
            IngestionSource::new(
                "extract_world_bank",
                "World Bank Regions API",
                &self.url(BANK_PATH),
            ),
            IngestionSource::new(
                "extract_pony_api",
                "PonyAPI Characters",
                &self.url(PONY_PATH),
            ),
        ])
    }
}

pub fn http_fetcher() -> Arc<dyn Fetcher> {
    Arc::new(HttpFetcher::new(Duration::from_secs(5)).expect("Failed to build HTTP client"))
}

/// Runner against `sources` whose simulated steps never wait and never fail.
pub fn reliable_runner(sources: &SourceServer) -> TaskRunner {
    TaskRunner::new(
        http_fetcher(),
        sources.catalog(),
        Box::new(FixedRandom(0.5)),
        RunSettings::instant(0.02),
    )
}

/// Collect every event still buffered on `rx`.
pub async fn drain(mut rx: mpsc::UnboundedReceiver<RunEvent>) -> Vec<RunEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

pub fn log_lines(events: &[RunEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            RunEvent::Log(entry) => Some(entry.message.clone()),
            _ => None,
        })
        .collect()
}
