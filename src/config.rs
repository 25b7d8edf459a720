use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::registry::{default_sources, IngestionSource};
use crate::metrics::DEFAULT_SAMPLE_COUNT;
use crate::{dlog_debug, Error, Result};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_API_KEY_ENV: &str = "API_KEY";
pub const DEFAULT_INSIGHTS_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_NEWS_API_KEY_ENV: &str = "WORLD_NEWS_API_KEY";

/// Task whose source URL takes the World News API key.
const WORLD_NEWS_TASK: &str = "extract_world_news";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model identifier sent with every insights request.
    pub model: String,
    /// Name of the environment variable holding the insights API key.
    pub api_key_env: String,
    pub insights_base_url: String,
    /// Name of the environment variable holding the World News API key.
    pub news_api_key_env: String,
    pub metrics_samples: usize,
    /// Chance that a simulated (non-ingestion) step fails.
    pub failure_rate: f64,
    /// Fixed part of a simulated step's duration.
    pub step_delay_ms: u64,
    /// Random extra on top of `step_delay_ms`.
    pub step_jitter_ms: u64,
    /// Per-request timeout for ingestion sources.
    pub request_timeout_secs: u64,
    /// Seed for simulated outcomes and metrics; OS entropy when unset.
    pub seed: Option<u64>,
    pub sources: Vec<IngestionSource>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            insights_base_url: DEFAULT_INSIGHTS_BASE_URL.to_string(),
            news_api_key_env: DEFAULT_NEWS_API_KEY_ENV.to_string(),
            metrics_samples: DEFAULT_SAMPLE_COUNT,
            failure_rate: 0.02,
            step_delay_ms: 1500,
            step_jitter_ms: 1000,
            request_timeout_secs: 20,
            seed: None,
            sources: default_sources(),
        }
    }
}

impl Config {
    pub fn datapipe_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".datapipe"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::datapipe_dir()?.join("datapipe.toml"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        dlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            dlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        dlog_debug!(
            "Config loaded: model={}, sources={}, failure_rate={}",
            config.model,
            config.sources.len(),
            config.failure_rate
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(Error::Validation(format!(
                "failure_rate must be within [0, 1], got {}",
                self.failure_rate
            )));
        }
        if self.metrics_samples == 0 {
            return Err(Error::Validation(
                "metrics_samples must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The insights API key, read from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        env_key(&self.api_key_env)
    }

    pub fn news_api_key(&self) -> Option<String> {
        env_key(&self.news_api_key_env)
    }

    /// Ingestion sources as the runner should pull them: the World News
    /// URL gains an `api-key` parameter when a key is set and the URL does
    /// not already carry one.
    pub fn resolved_sources(&self) -> Vec<IngestionSource> {
        with_news_key(&self.sources, self.news_api_key().as_deref())
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn step_jitter(&self) -> Duration {
        Duration::from_millis(self.step_jitter_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}

fn with_news_key(sources: &[IngestionSource], key: Option<&str>) -> Vec<IngestionSource> {
    let mut sources = sources.to_vec();
    let Some(key) = key else {
        return sources;
    };
    for source in sources
        .iter_mut()
        .filter(|s| s.task_id.as_str() == WORLD_NEWS_TASK && !s.url.contains("api-key="))
    {
        let sep = if source.url.contains('?') { '&' } else { '?' };
        source.url = format!("{}{}api-key={}", source.url, sep, key);
    }
    sources
}
