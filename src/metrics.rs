//! Synthetic ingestion metrics for the analytics view.
//!
//! The series is generated once at startup and never touched again.

use serde::Serialize;

use crate::random::RandomSource;

pub const DEFAULT_SAMPLE_COUNT: usize = 20;

const THROUGHPUT_BASE: f64 = 500.0;
const THROUGHPUT_SPREAD: f64 = 200.0;
const LATENCY_BASE_MS: f64 = 40.0;
const LATENCY_SPREAD_MS: f64 = 30.0;
/// A sample only carries errors when its draw exceeds this.
const ERROR_THRESHOLD: f64 = 0.9;
const MAX_ERRORS: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricSample {
    /// Ordinal position in the series.
    pub time: usize,
    /// Records per second.
    pub throughput: f64,
    /// Milliseconds.
    pub latency: f64,
    pub error_count: u32,
}

/// Build `count` samples with independent draws per field.
pub fn generate(count: usize, random: &mut dyn RandomSource) -> Vec<MetricSample> {
    (0..count)
        .map(|time| {
            let throughput = THROUGHPUT_BASE + random.next_f64() * THROUGHPUT_SPREAD;
            let latency = LATENCY_BASE_MS + random.next_f64() * LATENCY_SPREAD_MS;
            let error_count = if random.next_f64() > ERROR_THRESHOLD {
                (random.next_f64() * MAX_ERRORS).floor() as u32
            } else {
                0
            };
            MetricSample {
                time,
                throughput,
                latency,
                error_count,
            }
        })
        .collect()
}

/// Headline numbers for the stat cards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MetricsSummary {
    pub mean_throughput: f64,
    pub peak_throughput: f64,
    pub mean_latency: f64,
    pub total_errors: u32,
}

impl MetricsSummary {
    pub fn from_samples(samples: &[MetricSample]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let n = samples.len() as f64;
        Self {
            mean_throughput: samples.iter().map(|s| s.throughput).sum::<f64>() / n,
            peak_throughput: samples.iter().map(|s| s.throughput).fold(0.0, f64::max),
            mean_latency: samples.iter().map(|s| s.latency).sum::<f64>() / n,
            total_errors: samples.iter().map(|s| s.error_count).sum(),
        }
    }
}
