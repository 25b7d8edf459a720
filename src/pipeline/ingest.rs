//! HTTP pulls for Ingestion tasks.

use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::{IngestError, Result};
use crate::dlog_trace;

/// Rough shape of a decoded ingestion payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Top-level JSON array with this many elements.
    Items(usize),
    /// Object carrying a `top_news` field.
    TopNews,
    /// Anything else that decoded.
    Object,
}

impl Payload {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(items) => Payload::Items(items.len()),
            Value::Object(map) if map.get("top_news").is_some_and(truthy) => Payload::TopNews,
            _ => Payload::Object,
        }
    }

    /// Log line announcing a successful pull from `description`.
    pub fn describe(&self, description: &str) -> String {
        match self {
            Payload::Items(n) => format!("[FETCH] Received {} items from {}.", n, description),
            Payload::TopNews => {
                format!("[FETCH] Received top news articles from {}.", description)
            }
            Payload::Object => format!("[FETCH] Success! Received payload from {}.", description),
        }
    }
}

/// Loose truthiness: null, false, zero and the empty string are false.
/// Empty arrays and objects count as true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Pulls one ingestion endpoint.
pub trait Fetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, std::result::Result<Payload, IngestError>>;
}

/// `reqwest`-backed fetcher: plain GET, 2xx required, body must be JSON.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, std::result::Result<Payload, IngestError>> {
        Box::pin(async move {
            dlog_trace!("HttpFetcher::fetch url={}", url);
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(IngestError::from_reqwest)?;

            let status = response.status();
            if !status.is_success() {
                return Err(IngestError::http_status(status.as_u16()));
            }

            let body: Value = response.json().await.map_err(IngestError::from_reqwest)?;
            Ok(Payload::classify(&body))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_array() {
        let payload = Payload::classify(&json!([{"page": 1}, [{"id": "AFR"}]]));
        assert_eq!(payload, Payload::Items(2));
        assert_eq!(
            payload.describe("World Bank Regions API"),
            "[FETCH] Received 2 items from World Bank Regions API."
        );
    }

    #[test]
    fn test_classify_top_news() {
        let payload = Payload::classify(&json!({"top_news": [], "language": "en"}));
        assert_eq!(payload, Payload::TopNews);
        assert_eq!(Payload::classify(&json!({"top_news": "yes"})), Payload::TopNews);
        assert_eq!(Payload::classify(&json!({"top_news": 1})), Payload::TopNews);
        assert_eq!(
            payload.describe("World News API"),
            "[FETCH] Received top news articles from World News API."
        );
    }

    #[test]
    fn test_classify_plain_object() {
        assert_eq!(Payload::classify(&json!({"data": []})), Payload::Object);
        assert_eq!(Payload::classify(&json!({"top_news": null})), Payload::Object);
        assert_eq!(Payload::classify(&json!({"top_news": false})), Payload::Object);
        assert_eq!(Payload::classify(&json!({"top_news": 0})), Payload::Object);
        assert_eq!(Payload::classify(&json!({"top_news": ""})), Payload::Object);
        assert_eq!(Payload::classify(&json!("text")), Payload::Object);
        assert_eq!(
            Payload::Object.describe("PonyAPI Characters"),
            "[FETCH] Success! Received payload from PonyAPI Characters."
        );
    }
}
