//! Transport call metrics
//!
//! Tracks a rolling latency window and lifetime success rate of the calls
//! made by the dispatcher.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::RwLock;

/// Maximum number of samples kept for percentiles
const MAX_SAMPLES: usize = 100;

/// Snapshot of dispatcher metrics
#[derive(Debug, Clone)]
pub struct DispatchMetrics {
    /// Name of the transport
    pub transport_name: String,
    /// 50th percentile latency in milliseconds
    pub latency_p50_ms: f64,
    /// 99th percentile latency in milliseconds
    pub latency_p99_ms: f64,
    /// Success rate (0.0 to 1.0)
    pub success_rate: f64,
    pub total_requests: u64,
    pub failed_requests: u64,
}

#[derive(Debug, Default)]
struct Counters {
    samples: VecDeque<f64>,
    total: u64,
    failed: u64,
}

/// Collects metrics for one transport
pub struct MetricsCollector {
    transport_name: String,
    counters: RwLock<Counters>,
}

impl MetricsCollector {
    pub fn new(transport_name: &str) -> Self {
        Self {
            transport_name: transport_name.to_string(),
            counters: RwLock::new(Counters::default()),
        }
    }

    /// Records one call; only successful calls feed the latency window
    pub async fn record_request(&self, duration: Duration, success: bool) {
        let mut counters = self.counters.write().await;
        counters.total += 1;
        if !success {
            counters.failed += 1;
            return;
        }
        if counters.samples.len() >= MAX_SAMPLES {
            counters.samples.pop_front();
        }
        counters.samples.push_back(duration.as_micros() as f64 / 1000.0);
    }

    pub async fn get_metrics(&self) -> DispatchMetrics {
        let counters = self.counters.read().await;

        let mut latencies: Vec<f64> = counters.samples.iter().copied().collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let success_rate = if counters.total > 0 {
            (counters.total - counters.failed) as f64 / counters.total as f64
        } else {
            1.0
        };

        DispatchMetrics {
            transport_name: self.transport_name.clone(),
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            success_rate,
            total_requests: counters.total,
            failed_requests: counters.failed,
        }
    }
}

/// Percentile of sorted values, 0.0 when empty
fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    if sorted_values.is_empty() {
        return 0.0;
    }

    let idx = (p / 100.0 * (sorted_values.len() - 1) as f64).round() as usize;
    sorted_values[idx.min(sorted_values.len() - 1)]
}
