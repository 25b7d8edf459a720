//! Generative-AI insights about the current pipeline state.
//!
//! The client sends a prompt built from task statuses and the latest log
//! lines and hands back whatever text the model returns. Any failure
//! collapses into a fixed fallback message; the pipeline never sees it.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::{Config, DEFAULT_API_KEY_ENV};
use crate::core::task::TaskStatus;
use crate::error::{Error, Result};
use crate::pipeline::PipelineState;
use crate::{dlog_debug, dlog_error};

pub const INITIAL_INSIGHT: &str = "Run the pipeline to generate AI insights.";
pub const FALLBACK_INSIGHT: &str =
    "Unable to generate insights at this time. Check your pipeline connectivity.";
pub const EMPTY_INSIGHT: &str = "No insights available.";

/// How many of the newest log lines go into the prompt.
pub const PROMPT_LOG_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskBrief {
    pub name: String,
    pub status: TaskStatus,
}

/// What the model gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InsightSnapshot {
    pub tasks: Vec<TaskBrief>,
    /// Most recent rendered log lines, oldest first.
    pub logs: Vec<String>,
}

impl InsightSnapshot {
    pub fn capture(state: &PipelineState) -> Self {
        Self {
            tasks: state
                .tasks
                .iter()
                .map(|t| TaskBrief {
                    name: t.name.clone(),
                    status: t.status,
                })
                .collect(),
            logs: state
                .logs
                .tail(PROMPT_LOG_LINES)
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }

    pub fn prompt(&self) -> String {
        let tasks = serde_json::to_string(&self.tasks).unwrap_or_else(|_| "[]".to_string());
        let start = self.logs.len().saturating_sub(PROMPT_LOG_LINES);
        let logs = serde_json::to_string(&self.logs[start..]).unwrap_or_else(|_| "[]".to_string());
        format!(
            "Analyze this current Data Pipeline state and provide 3 actionable insights or observations as a Senior Data Engineer.\n\
             Keep it concise and technical.\n\
             \n\
             Current Tasks State: {tasks}\n\
             Latest Logs: {logs}\n"
        )
    }
}

/// A text-completion backend.
pub trait InsightsClient: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Gemini `generateContent` over REST.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    /// Where the key was looked up, for error messages.
    key_env: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
            key_env: DEFAULT_API_KEY_ENV.to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            key_env: config.api_key_env.clone(),
            ..Self::new(&config.insights_base_url, &config.model, config.api_key())
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String> {
        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| Error::Insights("response has no candidates".to_string()))?;
        Ok(candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default())
    }
}

impl InsightsClient for GeminiClient {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let key = self
                .api_key
                .as_deref()
                .ok_or_else(|| Error::MissingApiKey(self.key_env.clone()))?;

            let body = json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            });
            let response = self
                .http
                .post(self.endpoint())
                .header("x-goog-api-key", key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(Error::Insights(format!("HTTP Error {}", status.as_u16())));
            }

            response.json::<GenerateResponse>().await?.into_text()
        })
    }
}

/// Ask `client` about `snapshot`. Never fails: errors become
/// [`FALLBACK_INSIGHT`], empty answers become [`EMPTY_INSIGHT`].
pub async fn fetch_insights(client: &dyn InsightsClient, snapshot: &InsightSnapshot) -> String {
    let prompt = snapshot.prompt();
    dlog_debug!("Requesting insights ({} chars of prompt)", prompt.len());
    match client.generate(&prompt).await {
        Ok(text) if text.is_empty() => EMPTY_INSIGHT.to_string(),
        Ok(text) => text,
        Err(e) => {
            dlog_error!("Insights error: {}", e);
            FALLBACK_INSIGHT.to_string()
        }
    }
}
